// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validation of incoming user-creation requests.
//!
//! `validate` is a pure function over the request and the injected
//! process-wide default password, so the same input always produces the
//! same normalized record.

use boulder_common_secret::SecretString;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::user::{shorten_name, UserRecord};

/// The single accepted start-date format, e.g. `2023-01-01T00:00:00.000Z`.
pub const DATE_START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

static EMAIL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Incoming user-creation payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
	pub given_name: String,
	pub family_name: String,
	pub email: String,
	pub date_start: String,
	#[serde(default)]
	pub keep_alive: Option<String>,
	#[serde(default)]
	pub default_password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
	#[error("invalid email address: {0}")]
	InvalidEmail(String),

	#[error("start date {0:?} does not match yyyy-MM-ddTHH:mm:ss.fffZ")]
	InvalidDateFormat(String),

	#[error("no password supplied and no process-wide default configured")]
	MissingPassword,
}

/// Sanitize an email address by trimming whitespace and lowercasing.
pub fn sanitize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Validate a creation request into a `UserRecord`.
///
/// An empty or absent password falls back to `default_password`; if neither
/// is available the request is rejected. The start date must match
/// [`DATE_START_FORMAT`] exactly.
///
/// # Errors
/// Returns `ValidationError` describing the first failed check.
pub fn validate(
	request: &CreateUserRequest,
	default_password: Option<&SecretString>,
	default_keep_alive: &str,
) -> Result<UserRecord, ValidationError> {
	let email = sanitize_email(&request.email);
	if !EMAIL_REGEX.is_match(&email) {
		return Err(ValidationError::InvalidEmail(request.email.clone()));
	}

	let date_start = parse_date_start(&request.date_start)?;

	let password = match request.default_password.as_deref() {
		Some(p) if !p.is_empty() => SecretString::from(p),
		_ => match default_password {
			Some(d) if !d.is_empty() => d.clone(),
			_ => return Err(ValidationError::MissingPassword),
		},
	};

	let keep_alive = request
		.keep_alive
		.clone()
		.filter(|k| !k.is_empty())
		.unwrap_or_else(|| default_keep_alive.to_string());

	Ok(UserRecord {
		shortened_name: shorten_name(&request.given_name, &request.family_name),
		given_name: request.given_name.clone(),
		family_name: request.family_name.clone(),
		email,
		date_start,
		keep_alive,
		default_password: password,
		uaa_user_id: String::new(),
		org_id: String::new(),
		space_id: String::new(),
		user_exists: false,
		org_exists: false,
		space_exists: false,
		version: 0,
	})
}

/// Parse a start date in the fixed `yyyy-MM-ddTHH:mm:ss.fffZ` format.
pub fn parse_date_start(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
	NaiveDateTime::parse_from_str(raw, DATE_START_FORMAT)
		.map(|naive| naive.and_utc())
		.map_err(|_| ValidationError::InvalidDateFormat(raw.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request() -> CreateUserRequest {
		CreateUserRequest {
			given_name: "Jane".to_string(),
			family_name: "Smith".to_string(),
			email: "a@x.com".to_string(),
			date_start: "2023-01-01T00:00:00.000Z".to_string(),
			keep_alive: None,
			default_password: Some("".to_string()),
		}
	}

	#[test]
	fn empty_password_falls_back_to_process_default() {
		let default = SecretString::from("Def1");
		let record = validate(&request(), Some(&default), "720h").unwrap();
		assert_eq!(record.default_password.expose(), "Def1");
	}

	#[test]
	fn request_password_wins_over_default() {
		let mut req = request();
		req.default_password = Some("FromRequest".to_string());
		let default = SecretString::from("Def1");
		let record = validate(&req, Some(&default), "720h").unwrap();
		assert_eq!(record.default_password.expose(), "FromRequest");
	}

	#[test]
	fn missing_password_everywhere_is_rejected() {
		let err = validate(&request(), None, "720h").unwrap_err();
		assert!(matches!(err, ValidationError::MissingPassword));
	}

	#[test]
	fn wrong_date_format_is_rejected() {
		let mut req = request();
		req.date_start = "2023-01-01".to_string();
		let default = SecretString::from("Def1");
		let err = validate(&req, Some(&default), "720h").unwrap_err();
		assert!(matches!(err, ValidationError::InvalidDateFormat(_)));
	}

	#[test]
	fn rfc3339_without_millis_is_rejected() {
		let mut req = request();
		req.date_start = "2023-01-01T00:00:00Z".to_string();
		let default = SecretString::from("Def1");
		let err = validate(&req, Some(&default), "720h").unwrap_err();
		assert!(matches!(err, ValidationError::InvalidDateFormat(_)));
	}

	#[test]
	fn invalid_email_is_rejected() {
		let mut req = request();
		req.email = "not-an-email".to_string();
		let default = SecretString::from("Def1");
		let err = validate(&req, Some(&default), "720h").unwrap_err();
		assert!(matches!(err, ValidationError::InvalidEmail(_)));
	}

	#[test]
	fn email_is_sanitized() {
		let mut req = request();
		req.email = "  Jane@X.COM ".to_string();
		let default = SecretString::from("Def1");
		let record = validate(&req, Some(&default), "720h").unwrap();
		assert_eq!(record.email, "jane@x.com");
	}

	#[test]
	fn validation_is_deterministic() {
		let default = SecretString::from("Def1");
		let a = validate(&request(), Some(&default), "720h").unwrap();
		let b = validate(&request(), Some(&default), "720h").unwrap();
		assert_eq!(a.email, b.email);
		assert_eq!(a.shortened_name, b.shortened_name);
		assert_eq!(a.date_start, b.date_start);
		assert_eq!(a.keep_alive, b.keep_alive);
		assert_eq!(a.default_password.expose(), b.default_password.expose());
		assert_eq!(a.version, b.version);
	}

	#[test]
	fn shortened_name_is_derived() {
		let default = SecretString::from("Def1");
		let record = validate(&request(), Some(&default), "720h").unwrap();
		assert_eq!(record.shortened_name, "jsmith");
	}
}
