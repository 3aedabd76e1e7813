// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioning behavior configuration.

use boulder_common_secret::SecretString;
use serde::Deserialize;

/// Provisioning configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
	/// Process-wide fallback password for create requests that omit one.
	pub default_password: Option<SecretString>,
	/// Default keep-alive marker stamped onto new records.
	pub keep_alive: String,
	pub sweep_enabled: bool,
	pub sweep_interval_secs: u64,
	/// Bounded retries for transient reconcile failures.
	pub retry_attempts: u32,
}

/// Provisioning configuration layer (partial, for merging). The default
/// password is a secret and is injected from the environment at finalize
/// time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub keep_alive: Option<String>,
	#[serde(default)]
	pub sweep_enabled: Option<bool>,
	#[serde(default)]
	pub sweep_interval_secs: Option<u64>,
	#[serde(default)]
	pub retry_attempts: Option<u32>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.keep_alive.is_some() {
			self.keep_alive = other.keep_alive;
		}
		if other.sweep_enabled.is_some() {
			self.sweep_enabled = other.sweep_enabled;
		}
		if other.sweep_interval_secs.is_some() {
			self.sweep_interval_secs = other.sweep_interval_secs;
		}
		if other.retry_attempts.is_some() {
			self.retry_attempts = other.retry_attempts;
		}
	}

	pub fn finalize(self, default_password: Option<SecretString>) -> ProvisioningConfig {
		ProvisioningConfig {
			default_password,
			keep_alive: self.keep_alive.unwrap_or_else(|| "720h".to_string()),
			sweep_enabled: self.sweep_enabled.unwrap_or(true),
			sweep_interval_secs: self.sweep_interval_secs.unwrap_or(60),
			retry_attempts: self.retry_attempts.unwrap_or(3),
		}
	}
}
