// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Boulder server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`BOULDER_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use boulder_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}:{}", config.http.host, config.http.port);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{load_secret_env, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub platform: Option<PlatformConfig>,
	pub provisioning: ProvisioningConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`BOULDER_SERVER_*`)
/// 2. Config file (`/etc/boulder/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	let platform = layer.platform.unwrap_or_default().finalize(
		load_secret_env("BOULDER_SERVER_PLATFORM_UAA_CLIENT_SECRET"),
		load_secret_env("BOULDER_SERVER_PLATFORM_CAPI_PASSWORD"),
	);
	let provisioning = layer
		.provisioning
		.unwrap_or_default()
		.finalize(load_secret_env("BOULDER_SERVER_PROVISIONING_DEFAULT_PASSWORD"));

	validate_config(&provisioning)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		platform_configured = platform.is_some(),
		default_password_configured = provisioning.default_password.is_some(),
		sweep_enabled = provisioning.sweep_enabled,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		logging,
		platform,
		provisioning,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(provisioning: &ProvisioningConfig) -> Result<(), ConfigError> {
	if provisioning.sweep_enabled && provisioning.sweep_interval_secs == 0 {
		return Err(ConfigError::Validation(
			"BOULDER_SERVER_PROVISIONING_SWEEP_INTERVAL_SECS must be at least 1 when the sweep is enabled"
				.to_string(),
		));
	}
	if provisioning.retry_attempts == 0 {
		return Err(ConfigError::Validation(
			"BOULDER_SERVER_PROVISIONING_RETRY_ATTEMPTS must be at least 1".to_string(),
		));
	}
	Ok(())
}
