// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform endpoint configuration: the UAA identity API and the cloud
//! controller API the provisioning clients talk to.

use boulder_common_secret::SecretString;
use serde::Deserialize;

/// Platform configuration (runtime, fully resolved).
///
/// Absent entirely when no endpoints are configured; the server refuses to
/// start provisioning without it.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
	pub uaa_url: String,
	pub uaa_client_id: String,
	pub uaa_client_secret: SecretString,
	pub capi_url: String,
	pub capi_username: String,
	pub capi_password: SecretString,
	pub request_timeout_secs: u64,
}

/// Platform configuration layer (partial, for merging). Secrets are never
/// read from TOML; they are injected from the environment at finalize time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformConfigLayer {
	#[serde(default)]
	pub uaa_url: Option<String>,
	#[serde(default)]
	pub uaa_client_id: Option<String>,
	#[serde(default)]
	pub capi_url: Option<String>,
	#[serde(default)]
	pub capi_username: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

impl PlatformConfigLayer {
	pub fn merge(&mut self, other: PlatformConfigLayer) {
		if other.uaa_url.is_some() {
			self.uaa_url = other.uaa_url;
		}
		if other.uaa_client_id.is_some() {
			self.uaa_client_id = other.uaa_client_id;
		}
		if other.capi_url.is_some() {
			self.capi_url = other.capi_url;
		}
		if other.capi_username.is_some() {
			self.capi_username = other.capi_username;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
	}

	pub fn finalize(
		self,
		uaa_client_secret: Option<SecretString>,
		capi_password: Option<SecretString>,
	) -> Option<PlatformConfig> {
		let (Some(uaa_url), Some(capi_url)) = (self.uaa_url, self.capi_url) else {
			return None;
		};
		Some(PlatformConfig {
			uaa_url,
			uaa_client_id: self.uaa_client_id.unwrap_or_default(),
			uaa_client_secret: uaa_client_secret.unwrap_or_default(),
			capi_url,
			capi_username: self.capi_username.unwrap_or_default(),
			capi_password: capi_password.unwrap_or_default(),
			request_timeout_secs: self.request_timeout_secs.unwrap_or(30),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_absent_without_endpoints() {
		assert!(PlatformConfigLayer::default().finalize(None, None).is_none());
	}

	#[test]
	fn test_present_with_both_endpoints() {
		let layer = PlatformConfigLayer {
			uaa_url: Some("https://uaa.example.com".to_string()),
			uaa_client_id: Some("boulder".to_string()),
			capi_url: Some("https://api.example.com".to_string()),
			capi_username: Some("admin".to_string()),
			request_timeout_secs: None,
		};
		let config = layer
			.finalize(Some(SecretString::from("s1")), Some(SecretString::from("s2")))
			.unwrap();
		assert_eq!(config.uaa_url, "https://uaa.example.com");
		assert_eq!(config.request_timeout_secs, 30);
		assert_eq!(config.uaa_client_secret.expose(), "s1");
	}

	#[test]
	fn test_one_endpoint_is_not_enough() {
		let layer = PlatformConfigLayer {
			uaa_url: Some("https://uaa.example.com".to_string()),
			..Default::default()
		};
		assert!(layer.finalize(None, None).is_none());
	}
}
