// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use boulder_provisioning_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for StoreError {
	fn from(e: DbError) -> Self {
		match e {
			DbError::NotFound(msg) => StoreError::NotFound(msg),
			DbError::Conflict(msg) => StoreError::Conflict(msg),
			DbError::Sqlx(e) => StoreError::Backend(e.to_string()),
			DbError::Internal(msg) => StoreError::Backend(msg),
		}
	}
}
