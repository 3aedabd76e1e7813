// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared application state and the API error type.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use boulder_common_http::RetryableError;
use boulder_common_secret::SecretString;
use boulder_provisioning_core::{ReconcileError, Reconciler, ResourceKind, StoreError, ValidationError};
use boulder_server_db::{DbError, UserRepository};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub store: Arc<UserRepository>,
	pub reconciler: Arc<Reconciler<UserRepository>>,
	/// Process-wide fallback password for requests that omit one.
	pub default_password: Option<SecretString>,
	pub default_keep_alive: String,
	pub retry: boulder_common_http::RetryConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error("not found: {0}")]
	NotFound(String),

	#[error("conflict: {0}")]
	Conflict(String),

	#[error(transparent)]
	Reconcile(#[from] ReconcileError),

	#[error("internal error: {0}")]
	Internal(String),
}

impl From<StoreError> for ApiError {
	fn from(e: StoreError) -> Self {
		match e {
			StoreError::NotFound(msg) => ApiError::NotFound(msg),
			StoreError::Conflict(msg) => ApiError::Conflict(msg),
			StoreError::Backend(msg) => ApiError::Internal(msg),
		}
	}
}

impl From<DbError> for ApiError {
	fn from(e: DbError) -> Self {
		StoreError::from(e).into()
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error: &'static str,
	message: String,
}

fn validation_code(e: &ValidationError) -> &'static str {
	match e {
		ValidationError::InvalidEmail(_) => "invalid_email",
		ValidationError::InvalidDateFormat(_) => "invalid_date_format",
		ValidationError::MissingPassword => "missing_password",
	}
}

fn stage_code(kind: ResourceKind) -> &'static str {
	match kind {
		ResourceKind::IdentityAccount => "account_provisioning_failed",
		ResourceKind::Organization => "org_provisioning_failed",
		ResourceKind::Space => "space_provisioning_failed",
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let (status, error, message) = match &self {
			ApiError::Validation(e) => (StatusCode::BAD_REQUEST, validation_code(e), e.to_string()),
			ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
			ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
			ApiError::Reconcile(e) => match e {
				ReconcileError::Transient(msg) => {
					let body = ErrorBody {
						error: "transient",
						message: msg.clone(),
					};
					return (
						StatusCode::SERVICE_UNAVAILABLE,
						[("Retry-After", "30")],
						Json(body),
					)
						.into_response();
				}
				ReconcileError::Store(StoreError::Conflict(msg)) => {
					(StatusCode::CONFLICT, "conflict", msg.clone())
				}
				ReconcileError::Store(e) => {
					(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
				}
				e => {
					let code = e
						.failed_stage()
						.map(stage_code)
						.unwrap_or("reconcile_failed");
					(StatusCode::BAD_GATEWAY, code, e.to_string())
				}
			},
			ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg.clone()),
		};

		if status.is_server_error() {
			tracing::error!(%status, error, %message, "request failed");
		}

		(status, Json(ErrorBody { error, message })).into_response()
	}
}

/// Newtype bridging `ReconcileError` into the shared retry helper.
pub(crate) struct RetryableReconcile(pub ReconcileError);

impl std::fmt::Display for RetryableReconcile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

impl RetryableError for RetryableReconcile {
	fn is_retryable(&self) -> bool {
		self.0.is_transient()
	}
}
