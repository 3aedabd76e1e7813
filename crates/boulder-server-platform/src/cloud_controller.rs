// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization and space clients against the cloud controller v2 API.
//!
//! Both providers share one authenticated client. Creation mirrors what an
//! operator would do by hand: create the org, grant the user the manager
//! and user roles, then create the `-dev` space with the user as manager
//! and developer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use boulder_common_secret::SecretString;
use boulder_provisioning_core::{ProviderError, ResourceKind, ResourceProvider, UserRecord};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{from_reqwest, map_status};
use crate::token::{Grant, TokenSource};

#[derive(Debug, Clone)]
pub struct CloudControllerConfig {
	pub base_url: String,
	/// UAA base URL; the cloud controller shares UAA's token endpoint.
	pub uaa_url: String,
	pub username: String,
	pub password: SecretString,
	pub request_timeout: Duration,
}

struct CloudControllerClient {
	http: reqwest::Client,
	base_url: String,
	token: TokenSource,
}

/// Build the org and space providers over one shared client.
pub fn cloud_controller_providers(config: CloudControllerConfig) -> (OrgProvider, SpaceProvider) {
	let http = boulder_common_http::new_client_with_timeout(config.request_timeout);
	let token = TokenSource::new(
		http.clone(),
		format!("{}/oauth/token", config.uaa_url),
		Grant::Password {
			username: config.username,
			password: config.password,
		},
	);
	let client = Arc::new(CloudControllerClient {
		http,
		base_url: config.base_url,
		token,
	});
	(
		OrgProvider {
			cc: Arc::clone(&client),
		},
		SpaceProvider { cc: client },
	)
}

#[derive(Deserialize)]
struct ResourceMetadata {
	guid: String,
}

#[derive(Deserialize)]
struct Resource {
	metadata: ResourceMetadata,
}

#[derive(Deserialize)]
struct ListResponse {
	#[serde(default)]
	resources: Vec<Resource>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
	#[serde(default)]
	error_code: String,
	#[serde(default)]
	description: String,
}

#[derive(Serialize)]
struct CreateOrgRequest<'a> {
	name: &'a str,
}

#[derive(Serialize)]
struct CreateSpaceRequest<'a> {
	name: &'a str,
	organization_guid: &'a str,
	manager_guids: Vec<&'a str>,
	developer_guids: Vec<&'a str>,
}

/// Translate a cloud controller error response, recognizing name collisions
/// reported as 400 + `CF-*NameTaken` rather than 409.
fn map_cc_error(status: StatusCode, body: &ApiErrorBody, context: &str) -> ProviderError {
	if body.error_code.ends_with("NameTaken") {
		return ProviderError::AlreadyExists;
	}
	if body.error_code.ends_with("QuotaExceeded") {
		return ProviderError::QuotaExceeded(format!("{context}: {}", body.description));
	}
	map_status(status, context)
}

impl CloudControllerClient {
	async fn find_guid(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>, ProviderError> {
		let bearer = self.token.bearer().await?;
		let context = "query cloud controller";
		let response = self
			.http
			.get(format!("{}{path}", self.base_url))
			.bearer_auth(bearer)
			.query(query)
			.send()
			.await
			.map_err(|e| from_reqwest(e, context))?;

		let status = response.status();
		if !status.is_success() {
			return Err(map_status(status, context));
		}

		let list: ListResponse = response
			.json()
			.await
			.map_err(|e| from_reqwest(e, context))?;

		Ok(list.resources.into_iter().next().map(|r| r.metadata.guid))
	}

	async fn create_resource<T: Serialize>(
		&self,
		path: &str,
		payload: &T,
		context: &str,
	) -> Result<String, ProviderError> {
		let bearer = self.token.bearer().await?;
		let response = self
			.http
			.post(format!("{}{path}", self.base_url))
			.bearer_auth(bearer)
			.json(payload)
			.send()
			.await
			.map_err(|e| from_reqwest(e, context))?;

		let status = response.status();
		if !status.is_success() {
			let body: ApiErrorBody = response.json().await.unwrap_or(ApiErrorBody {
				error_code: String::new(),
				description: String::new(),
			});
			return Err(map_cc_error(status, &body, context));
		}

		let created: Resource = response
			.json()
			.await
			.map_err(|e| from_reqwest(e, context))?;
		Ok(created.metadata.guid)
	}

	/// PUT an association (role grant); the v2 API is idempotent here.
	async fn associate(&self, path: &str, context: &str) -> Result<(), ProviderError> {
		let bearer = self.token.bearer().await?;
		let response = self
			.http
			.put(format!("{}{path}", self.base_url))
			.bearer_auth(bearer)
			.send()
			.await
			.map_err(|e| from_reqwest(e, context))?;

		let status = response.status();
		if !status.is_success() {
			return Err(map_status(status, context));
		}
		Ok(())
	}
}

/// Organizations named `{short}-org`, owned by their user.
pub struct OrgProvider {
	cc: Arc<CloudControllerClient>,
}

#[async_trait]
impl ResourceProvider for OrgProvider {
	fn kind(&self) -> ResourceKind {
		ResourceKind::Organization
	}

	async fn find(&self, record: &UserRecord) -> Result<Option<String>, ProviderError> {
		self.cc
			.find_guid(
				"/v2/organizations",
				&[("q", format!("name:{}", record.org_name()))],
			)
			.await
	}

	async fn create(&self, record: &UserRecord) -> Result<String, ProviderError> {
		let name = record.org_name();
		debug!(org = %name, "creating organization");
		let guid = self
			.cc
			.create_resource(
				"/v2/organizations",
				&CreateOrgRequest { name: &name },
				"create organization",
			)
			.await?;

		self.cc
			.associate(
				&format!("/v2/organizations/{guid}/managers/{}", record.uaa_user_id),
				"associate org manager",
			)
			.await?;
		self.cc
			.associate(
				&format!("/v2/organizations/{guid}/users/{}", record.uaa_user_id),
				"associate org user",
			)
			.await?;

		Ok(guid)
	}
}

/// Spaces named `{short}-dev`, scoped to the user's organization.
pub struct SpaceProvider {
	cc: Arc<CloudControllerClient>,
}

#[async_trait]
impl ResourceProvider for SpaceProvider {
	fn kind(&self) -> ResourceKind {
		ResourceKind::Space
	}

	async fn find(&self, record: &UserRecord) -> Result<Option<String>, ProviderError> {
		self.cc
			.find_guid(
				"/v2/spaces",
				&[
					("q", format!("name:{}", record.space_name())),
					("q", format!("organization_guid:{}", record.org_id)),
				],
			)
			.await
	}

	async fn create(&self, record: &UserRecord) -> Result<String, ProviderError> {
		let name = record.space_name();
		debug!(space = %name, org_id = %record.org_id, "creating space");
		self.cc
			.create_resource(
				"/v2/spaces",
				&CreateSpaceRequest {
					name: &name,
					organization_guid: &record.org_id,
					manager_guids: vec![&record.uaa_user_id],
					developer_guids: vec![&record.uaa_user_id],
				},
				"create space",
			)
			.await
	}
}
