// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Liveness endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::api::AppState;

#[derive(Serialize)]
struct HealthResponse {
	status: &'static str,
	timestamp: String,
}

/// GET /health - database-backed liveness check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let database_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

	let (http_status, status) = if database_ok {
		(StatusCode::OK, "ok")
	} else {
		tracing::error!("health check failed: database unreachable");
		(StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
	};

	(
		http_status,
		Json(HealthResponse {
			status,
			timestamp: chrono::Utc::now().to_rfc3339(),
		}),
	)
}
