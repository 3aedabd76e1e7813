// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth token acquisition against the UAA token endpoint.
//!
//! Tokens are cached until shortly before expiry; concurrent callers share
//! one refresh through the mutex.

use std::time::{Duration, Instant};

use boulder_common_secret::SecretString;
use boulder_provisioning_core::ProviderError;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{from_reqwest, map_status};

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

pub(crate) enum Grant {
	ClientCredentials {
		client_id: String,
		client_secret: SecretString,
	},
	Password {
		username: String,
		password: SecretString,
	},
}

struct CachedToken {
	access_token: String,
	expires_at: Instant,
}

pub(crate) struct TokenSource {
	http: reqwest::Client,
	token_url: String,
	grant: Grant,
	cached: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: u64,
}

impl TokenSource {
	pub(crate) fn new(http: reqwest::Client, token_url: String, grant: Grant) -> Self {
		Self {
			http,
			token_url,
			grant,
			cached: Mutex::new(None),
		}
	}

	/// Return a bearer token, refreshing through the token endpoint when
	/// the cached one is missing or about to expire.
	pub(crate) async fn bearer(&self) -> Result<String, ProviderError> {
		let mut cached = self.cached.lock().await;
		if let Some(token) = cached.as_ref() {
			if token.expires_at > Instant::now() {
				return Ok(token.access_token.clone());
			}
		}

		debug!(token_url = %self.token_url, "fetching fresh access token");
		let request = match &self.grant {
			Grant::ClientCredentials {
				client_id,
				client_secret,
			} => self
				.http
				.post(&self.token_url)
				.basic_auth(client_id, Some(client_secret.expose()))
				.form(&[("grant_type", "client_credentials")]),
			// The cloud controller authenticates end-user style through the
			// well-known "cf" public client.
			Grant::Password { username, password } => self
				.http
				.post(&self.token_url)
				.basic_auth("cf", Some(""))
				.form(&[
					("grant_type", "password"),
					("username", username.as_str()),
					("password", password.expose()),
				]),
		};

		let response = request
			.send()
			.await
			.map_err(|e| from_reqwest(e, "token request"))?;

		let status = response.status();
		if !status.is_success() {
			return Err(map_status(status, "token request"));
		}

		let body: TokenResponse = response
			.json()
			.await
			.map_err(|e| from_reqwest(e, "token response"))?;

		let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
		*cached = Some(CachedToken {
			access_token: body.access_token.clone(),
			expires_at: Instant::now() + lifetime,
		});

		Ok(body.access_token)
	}
}
