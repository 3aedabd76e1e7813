// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Durable state store contract.

use async_trait::async_trait;

use crate::user::UserRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// The stored record's version no longer matches the caller's copy.
	#[error("conflict: {0}")]
	Conflict(String),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("store backend error: {0}")]
	Backend(String),
}

/// Durable record of known users, one per unique email.
///
/// `upsert` uses optimistic concurrency: the record's `version` must match
/// the stored row or the write fails with `Conflict`, never blocking. The
/// returned record carries the bumped version.
#[async_trait]
pub trait UserStore: Send + Sync {
	async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

	async fn upsert(&self, record: &UserRecord) -> Result<UserRecord, StoreError>;

	async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;
}
