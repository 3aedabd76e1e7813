// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! UAA identity-account client (SCIM Users API).

use std::time::Duration;

use async_trait::async_trait;
use boulder_common_secret::SecretString;
use boulder_provisioning_core::{ProviderError, ResourceKind, ResourceProvider, UserRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{from_reqwest, map_status};
use crate::token::{Grant, TokenSource};

#[derive(Debug, Clone)]
pub struct UaaConfig {
	pub base_url: String,
	pub client_id: String,
	pub client_secret: SecretString,
	pub request_timeout: Duration,
}

/// Identity accounts keyed by email (the SCIM userName).
pub struct UaaIdentityClient {
	http: reqwest::Client,
	base_url: String,
	token: TokenSource,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScimName<'a> {
	given_name: &'a str,
	family_name: &'a str,
}

#[derive(Serialize)]
struct ScimEmail<'a> {
	value: &'a str,
	primary: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScimCreateUser<'a> {
	user_name: &'a str,
	password: &'a str,
	name: ScimName<'a>,
	emails: Vec<ScimEmail<'a>>,
}

#[derive(Deserialize)]
struct ScimResource {
	id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScimListResponse {
	#[serde(default)]
	resources: Vec<ScimResource>,
}

impl UaaIdentityClient {
	pub fn new(config: UaaConfig) -> Self {
		let http = boulder_common_http::new_client_with_timeout(config.request_timeout);
		let token = TokenSource::new(
			http.clone(),
			format!("{}/oauth/token", config.base_url),
			Grant::ClientCredentials {
				client_id: config.client_id,
				client_secret: config.client_secret,
			},
		);
		Self {
			http,
			base_url: config.base_url,
			token,
		}
	}

	fn create_payload<'a>(record: &'a UserRecord) -> ScimCreateUser<'a> {
		ScimCreateUser {
			user_name: &record.email,
			password: record.default_password.expose(),
			name: ScimName {
				given_name: &record.given_name,
				family_name: &record.family_name,
			},
			emails: vec![ScimEmail {
				value: &record.email,
				primary: true,
			}],
		}
	}
}

#[async_trait]
impl ResourceProvider for UaaIdentityClient {
	fn kind(&self) -> ResourceKind {
		ResourceKind::IdentityAccount
	}

	async fn find(&self, record: &UserRecord) -> Result<Option<String>, ProviderError> {
		let bearer = self.token.bearer().await?;
		let response = self
			.http
			.get(format!("{}/Users", self.base_url))
			.bearer_auth(bearer)
			.query(&[
				("filter", format!("userName eq \"{}\"", record.email)),
				("count", "1".to_string()),
			])
			.send()
			.await
			.map_err(|e| from_reqwest(e, "find identity account"))?;

		let status = response.status();
		if !status.is_success() {
			return Err(map_status(status, "find identity account"));
		}

		let list: ScimListResponse = response
			.json()
			.await
			.map_err(|e| from_reqwest(e, "find identity account response"))?;

		Ok(list.resources.into_iter().next().map(|r| r.id))
	}

	async fn create(&self, record: &UserRecord) -> Result<String, ProviderError> {
		let bearer = self.token.bearer().await?;
		debug!(email = %record.email, "creating identity account");
		let response = self
			.http
			.post(format!("{}/Users", self.base_url))
			.bearer_auth(bearer)
			.json(&Self::create_payload(record))
			.send()
			.await
			.map_err(|e| from_reqwest(e, "create identity account"))?;

		let status = response.status();
		if !status.is_success() {
			return Err(map_status(status, "create identity account"));
		}

		let created: ScimResource = response
			.json()
			.await
			.map_err(|e| from_reqwest(e, "create identity account response"))?;

		Ok(created.id)
	}
}
