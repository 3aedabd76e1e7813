// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end tests for the user API over stub providers.

mod support;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use boulder_server::create_router;
use support::{build_state, default_stubs, StubMode, StubProvider};
use tower::ServiceExt;

async fn app() -> Router {
	let (identity, orgs, spaces) = default_stubs();
	create_router(build_state(identity, orgs, spaces).await)
}

async fn body_json(response: Response) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

fn create_request(body: &str) -> Request<Body> {
	Request::builder()
		.method(Method::POST)
		.uri("/api/user")
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.unwrap()
}

fn valid_body(email: &str) -> String {
	format!(
		r#"{{"givenName":"Jane","familyName":"Smith","email":"{email}","dateStart":"2023-01-01T00:00:00.000Z","defaultPassword":""}}"#
	)
}

#[tokio::test]
async fn get_unknown_user_returns_404() {
	let app = app().await;
	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/user/nobody@x.com")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	let body = body_json(response).await;
	assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn create_user_provisions_and_returns_201() {
	let app = app().await;
	let response = app
		.clone()
		.oneshot(create_request(&valid_body("a@x.com")))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::CREATED);
	let body = body_json(response).await;
	assert_eq!(body["email"], "a@x.com");
	assert_eq!(body["state"], "fully_provisioned");
	assert_eq!(body["userExists"], true);
	assert_eq!(body["orgExists"], true);
	assert_eq!(body["spaceExists"], true);
	assert_eq!(body["uaaUserId"], "uaa-1");
	assert_eq!(body["orgId"], "org-1");
	assert_eq!(body["spaceId"], "space-1");
	assert_eq!(body["shortenedName"], "jsmith");
	// the password never leaves the service
	assert!(body.get("defaultPassword").is_none());

	// the provisioned record is visible through the lookup endpoint
	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/user/a@x.com")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["state"], "fully_provisioned");
}

#[tokio::test]
async fn duplicate_email_returns_409() {
	let app = app().await;
	let first = app
		.clone()
		.oneshot(create_request(&valid_body("a@x.com")))
		.await
		.unwrap();
	assert_eq!(first.status(), StatusCode::CREATED);

	let second = app
		.oneshot(create_request(&valid_body("a@x.com")))
		.await
		.unwrap();
	assert_eq!(second.status(), StatusCode::CONFLICT);
	let body = body_json(second).await;
	assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn wrong_date_format_returns_400() {
	let app = app().await;
	let response = app
		.oneshot(create_request(
			r#"{"givenName":"Jane","familyName":"Smith","email":"a@x.com","dateStart":"2023-01-01"}"#,
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body = body_json(response).await;
	assert_eq!(body["error"], "invalid_date_format");
}

#[tokio::test]
async fn invalid_email_returns_400() {
	let app = app().await;
	let response = app
		.oneshot(create_request(
			r#"{"givenName":"Jane","familyName":"Smith","email":"not-an-email","dateStart":"2023-01-01T00:00:00.000Z"}"#,
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body = body_json(response).await;
	assert_eq!(body["error"], "invalid_email");
}

#[tokio::test]
async fn rejected_validation_creates_no_record() {
	let app = app().await;
	let response = app
		.clone()
		.oneshot(create_request(
			r#"{"givenName":"Jane","familyName":"Smith","email":"a@x.com","dateStart":"2023-01-01"}"#,
		))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/user/a@x.com")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_password_without_default_returns_400() {
	let (identity, orgs, spaces) = default_stubs();
	let mut state = build_state(identity, orgs, spaces).await;
	state.default_password = None;
	let app = create_router(state);

	let response = app
		.oneshot(create_request(
			r#"{"givenName":"Jane","familyName":"Smith","email":"a@x.com","dateStart":"2023-01-01T00:00:00.000Z"}"#,
		))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	let body = body_json(response).await;
	assert_eq!(body["error"], "missing_password");
}

#[tokio::test]
async fn list_users_returns_collection() {
	let app = app().await;
	for email in ["a@x.com", "b@x.com"] {
		let response = app
			.clone()
			.oneshot(create_request(&valid_body(email)))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::CREATED);
	}

	let response = app
		.oneshot(Request::builder().uri("/api/user").body(Body::empty()).unwrap())
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	let users = body.as_array().unwrap();
	assert_eq!(users.len(), 2);
	assert_eq!(users[0]["email"], "a@x.com");
	assert_eq!(users[1]["email"], "b@x.com");
}

#[tokio::test]
async fn permanent_provider_failure_returns_502_and_keeps_partial_record() {
	let (_, orgs, spaces) = default_stubs();
	let identity = StubProvider::new(
		boulder_provisioning_core::ResourceKind::IdentityAccount,
		"uaa-1",
	)
	.with_mode(StubMode::Unauthorized);
	let app = create_router(build_state(identity, orgs, spaces).await);

	let response = app
		.clone()
		.oneshot(create_request(&valid_body("a@x.com")))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	let body = body_json(response).await;
	assert_eq!(body["error"], "account_provisioning_failed");

	// the record survives in its unprovisioned state for later inspection
	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/user/a@x.com")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["state"], "unprovisioned");
	assert_eq!(body["userExists"], false);
}

#[tokio::test]
async fn transient_provider_failure_returns_503_with_retry_hint() {
	let (identity, _, spaces) = default_stubs();
	let orgs = StubProvider::new(boulder_provisioning_core::ResourceKind::Organization, "org-1")
		.with_mode(StubMode::Transient);
	let app = create_router(build_state(identity, orgs, spaces).await);

	let response = app
		.clone()
		.oneshot(create_request(&valid_body("a@x.com")))
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(response.headers().get("Retry-After").unwrap(), "30");

	// the account stage completed and was checkpointed before the failure
	let response = app
		.oneshot(
			Request::builder()
				.uri("/api/user/a@x.com")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();
	let body = body_json(response).await;
	assert_eq!(body["state"], "account_created");
	assert_eq!(body["uaaUserId"], "uaa-1");
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
	let app = app().await;
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["status"], "ok");
}
