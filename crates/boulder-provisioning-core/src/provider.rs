// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The platform resource capability boundary.
//!
//! The reconciler depends on this capability set only; the concrete
//! protocol (UAA, cloud controller, an in-memory fake) is a collaborator
//! behind the trait.

use async_trait::async_trait;

use crate::user::UserRecord;

/// The resource kinds a user is converged against, in stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
	IdentityAccount,
	Organization,
	Space,
}

impl std::fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ResourceKind::IdentityAccount => f.write_str("identity account"),
			ResourceKind::Organization => f.write_str("organization"),
			ResourceKind::Space => f.write_str("space"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	/// A concurrent creator won the race; the caller should re-query.
	#[error("resource already exists")]
	AlreadyExists,

	#[error("provider quota exceeded: {0}")]
	QuotaExceeded(String),

	#[error("provider rejected credentials: {0}")]
	Unauthorized(String),

	/// Any other permanent protocol-level rejection (malformed request,
	/// unexpected status). Not retryable.
	#[error("provider rejected request: {0}")]
	Rejected(String),

	/// Network failures, timeouts, and 5xx responses. Safe to retry.
	#[error("transient provider failure: {0}")]
	Transient(String),
}

impl ProviderError {
	pub fn is_transient(&self) -> bool {
		matches!(self, ProviderError::Transient(_))
	}
}

/// One platform resource kind a user record can be converged against.
///
/// `find` keys off the record (email for accounts, derived names for org and
/// space); `create` must be idempotent at the provider side, reporting
/// `AlreadyExists` rather than duplicating. The space provider reads the org
/// id off the record, which stage ordering guarantees is present.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
	fn kind(&self) -> ResourceKind;

	/// Look up the resource for this record, returning its id if present.
	async fn find(&self, record: &UserRecord) -> Result<Option<String>, ProviderError>;

	/// Create the resource for this record, returning the new id.
	async fn create(&self, record: &UserRecord) -> Result<String, ProviderError>;
}
