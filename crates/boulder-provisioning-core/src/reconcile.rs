// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The provisioning reconciler.
//!
//! Converges a user record against the identity account, organization, and
//! space providers, in that order. Every stage is check-then-create: the
//! resource is looked up before any create is attempted, so re-running the
//! reconciler on a partially provisioned record resumes at the first
//! missing resource and never duplicates work. Progress is checkpointed to
//! the state store after every stage, not only at the end of a run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::provider::{ProviderError, ResourceKind, ResourceProvider};
use crate::store::{StoreError, UserStore};
use crate::user::UserRecord;

/// Upper bound on optimistic-concurrency restarts within one run. Beyond
/// this the contention is reported as transient and left to caller backoff.
const MAX_CONFLICT_RESTARTS: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
	#[error("identity account provisioning failed: {0}")]
	AccountProvisioningFailed(String),

	#[error("organization provisioning failed: {0}")]
	OrgProvisioningFailed(String),

	#[error("space provisioning failed: {0}")]
	SpaceProvisioningFailed(String),

	/// Network-level failure somewhere in the run. Safe to retry with
	/// backoff; completed stages are already persisted.
	#[error("transient provisioning failure: {0}")]
	Transient(String),

	#[error("state store error: {0}")]
	Store(#[from] StoreError),
}

impl ReconcileError {
	pub fn is_transient(&self) -> bool {
		matches!(self, ReconcileError::Transient(_))
	}

	/// The stage that failed, when the error names one.
	pub fn failed_stage(&self) -> Option<ResourceKind> {
		match self {
			ReconcileError::AccountProvisioningFailed(_) => Some(ResourceKind::IdentityAccount),
			ReconcileError::OrgProvisioningFailed(_) => Some(ResourceKind::Organization),
			ReconcileError::SpaceProvisioningFailed(_) => Some(ResourceKind::Space),
			_ => None,
		}
	}
}

enum Pass {
	Converged(UserRecord),
	/// A checkpoint lost an optimistic race; carry the re-read record.
	Restart(UserRecord),
}

enum Checkpointed {
	Stored(UserRecord),
	Conflicted(UserRecord),
}

/// Drives a user record toward the fully provisioned state.
///
/// Stateless between runs: the record's existence flags are the only
/// progress marker, so the reconciler is safe to re-invoke at any point and
/// safe to run concurrently with other instances against the same store.
pub struct Reconciler<S> {
	store: Arc<S>,
	identity: Arc<dyn ResourceProvider>,
	organization: Arc<dyn ResourceProvider>,
	space: Arc<dyn ResourceProvider>,
}

impl<S: UserStore> Reconciler<S> {
	pub fn new(
		store: Arc<S>,
		identity: Arc<dyn ResourceProvider>,
		organization: Arc<dyn ResourceProvider>,
		space: Arc<dyn ResourceProvider>,
	) -> Self {
		Self {
			store,
			identity,
			organization,
			space,
		}
	}

	/// Converge `record` against all three providers.
	///
	/// # Errors
	/// Returns a typed error naming the failed stage; state persisted by
	/// earlier checkpoints is never rolled back.
	#[tracing::instrument(skip(self, record), fields(email = %record.email))]
	pub async fn reconcile(&self, mut record: UserRecord) -> Result<UserRecord, ReconcileError> {
		for _ in 0..MAX_CONFLICT_RESTARTS {
			match self.run_stages(record).await? {
				Pass::Converged(r) => {
					info!(state = ?r.provisioning_state(), "reconciliation complete");
					return Ok(r);
				}
				Pass::Restart(r) => {
					debug!("restarting after checkpoint conflict");
					record = r;
				}
			}
		}
		Err(ReconcileError::Transient(
			"persistent state-store contention".to_string(),
		))
	}

	async fn run_stages(&self, mut record: UserRecord) -> Result<Pass, ReconcileError> {
		if !record.user_exists {
			let outcome = converge(self.identity.as_ref(), &record).await;
			if let Ok(id) = &outcome {
				record.assign_account(id.clone());
			}
			match self.checkpoint(record).await? {
				Checkpointed::Stored(r) => record = r,
				Checkpointed::Conflicted(r) => return Ok(Pass::Restart(r)),
			}
			outcome.map_err(|e| stage_error(ResourceKind::IdentityAccount, e))?;
		}

		// Later stages hang resources off the account; without an id there
		// is nothing to attach them to.
		if record.uaa_user_id.is_empty() {
			return Err(ReconcileError::AccountProvisioningFailed(
				"no identity account id after account stage".to_string(),
			));
		}

		if !record.org_exists {
			let outcome = converge(self.organization.as_ref(), &record).await;
			if let Ok(id) = &outcome {
				record.assign_org(id.clone());
			}
			match self.checkpoint(record).await? {
				Checkpointed::Stored(r) => record = r,
				Checkpointed::Conflicted(r) => return Ok(Pass::Restart(r)),
			}
			outcome.map_err(|e| stage_error(ResourceKind::Organization, e))?;
		}

		if !record.space_exists {
			let outcome = converge(self.space.as_ref(), &record).await;
			if let Ok(id) = &outcome {
				record.assign_space(id.clone());
			}
			match self.checkpoint(record).await? {
				Checkpointed::Stored(r) => record = r,
				Checkpointed::Conflicted(r) => return Ok(Pass::Restart(r)),
			}
			outcome.map_err(|e| stage_error(ResourceKind::Space, e))?;
		}

		Ok(Pass::Converged(record))
	}

	/// Persist partial progress. A version conflict means another
	/// reconciler wrote this record first; adopt its copy and re-derive
	/// state from the flags instead of overwriting.
	async fn checkpoint(&self, record: UserRecord) -> Result<Checkpointed, ReconcileError> {
		match self.store.upsert(&record).await {
			Ok(stored) => Ok(Checkpointed::Stored(stored)),
			Err(StoreError::Conflict(detail)) => {
				warn!(email = %record.email, detail = %detail, "checkpoint lost optimistic race, re-reading");
				let stored = self
					.store
					.get_by_email(&record.email)
					.await?
					.ok_or_else(|| StoreError::NotFound(record.email.clone()))?;
				Ok(Checkpointed::Conflicted(stored))
			}
			Err(e) => Err(e.into()),
		}
	}
}

/// Check-then-create against one provider.
///
/// An `AlreadyExists` response to create means a concurrent reconciler won
/// the race; the resource is re-queried and adopted as if it had been found
/// in the first place.
async fn converge(
	provider: &dyn ResourceProvider,
	record: &UserRecord,
) -> Result<String, ProviderError> {
	let kind = provider.kind();
	if let Some(id) = provider.find(record).await? {
		debug!(%kind, id = %id, "resource already present");
		return Ok(id);
	}

	match provider.create(record).await {
		Ok(id) => {
			info!(%kind, id = %id, "created resource");
			Ok(id)
		}
		Err(ProviderError::AlreadyExists) => {
			info!(%kind, "create raced a concurrent reconciler, adopting existing resource");
			provider.find(record).await?.ok_or_else(|| {
				ProviderError::Transient(format!(
					"{kind} reported existing but was not found on re-query"
				))
			})
		}
		Err(e) => Err(e),
	}
}

fn stage_error(kind: ResourceKind, e: ProviderError) -> ReconcileError {
	if e.is_transient() {
		return ReconcileError::Transient(e.to_string());
	}
	match kind {
		ResourceKind::IdentityAccount => ReconcileError::AccountProvisioningFailed(e.to_string()),
		ResourceKind::Organization => ReconcileError::OrgProvisioningFailed(e.to_string()),
		ResourceKind::Space => ReconcileError::SpaceProvisioningFailed(e.to_string()),
	}
}
