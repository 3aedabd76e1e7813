// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{routing::get, Router};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};

use crate::api::AppState;
use crate::routes::{health, users};

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health::health_check))
		.route("/api/user", get(users::list_users).post(users::create_user))
		.route("/api/user/{email}", get(users::get_user))
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		)
		.with_state(state)
}
