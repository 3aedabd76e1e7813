// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User lookup and creation handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use boulder_common_http::retry;
use boulder_provisioning_core::validate::sanitize_email;
use boulder_provisioning_core::{
	validate, CreateUserRequest, ProvisioningState, ReconcileError, StoreError, UserRecord,
};
use serde::Serialize;
use tracing::info;

use crate::api::{ApiError, AppState, RetryableReconcile};

/// A user record plus its derived provisioning state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
	#[serde(flatten)]
	record: UserRecord,
	state: ProvisioningState,
}

impl From<UserRecord> for UserResponse {
	fn from(record: UserRecord) -> Self {
		let state = record.provisioning_state();
		Self { record, state }
	}
}

/// GET /api/user - list all known users.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
	let records = state.store.list().await?;
	info!(count = records.len(), "listing users");
	Ok(Json(records.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/user/{email} - look up one user by email.
pub async fn get_user(
	State(state): State<AppState>,
	Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
	let email = sanitize_email(&email);
	match state.store.get_by_email(&email).await? {
		Some(record) => Ok(Json(record.into())),
		None => Err(ApiError::NotFound(format!("user {email} not found"))),
	}
}

/// POST /api/user - validate, persist, and provision a new user.
///
/// The record is persisted before any provider call and re-read from the
/// store on every reconcile attempt, so a transient failure mid-run leaves
/// an inspectable partial record that the next attempt (or the sweep)
/// resumes from.
pub async fn create_user(
	State(state): State<AppState>,
	Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
	let record = validate(
		&request,
		state.default_password.as_ref(),
		&state.default_keep_alive,
	)?;

	if state.store.get_by_email(&record.email).await?.is_some() {
		return Err(ApiError::Conflict(format!(
			"user {} already exists",
			record.email
		)));
	}

	let record = state.store.upsert(&record).await?;
	let email = record.email.clone();

	let provisioned = retry(&state.retry, || {
		let email = email.clone();
		let state = state.clone();
		async move {
			let current = state
				.store
				.get_by_email(&email)
				.await
				.map_err(|e| RetryableReconcile(ReconcileError::Store(e.into())))?
				.ok_or_else(|| {
					RetryableReconcile(ReconcileError::Store(StoreError::NotFound(email.clone())))
				})?;
			state
				.reconciler
				.reconcile(current)
				.await
				.map_err(RetryableReconcile)
		}
	})
	.await
	.map_err(|RetryableReconcile(e)| ApiError::Reconcile(e))?;

	info!(
		email = %provisioned.email,
		state = ?provisioned.provisioning_state(),
		"provisioned user"
	);

	Ok((StatusCode::CREATED, Json(provisioned.into())))
}
