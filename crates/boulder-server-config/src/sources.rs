// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files, and environment
//! variables.

use std::path::PathBuf;
use std::str::FromStr;

use boulder_common_secret::SecretString;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, PlatformConfigLayer,
	ProvisioningConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/boulder/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `BOULDER_SERVER_<SECTION>_<FIELD>`
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: env_string("BOULDER_SERVER_HTTP_HOST"),
				port: env_parse("BOULDER_SERVER_HTTP_PORT")?,
			}),
			database: Some(DatabaseConfigLayer {
				url: env_string("BOULDER_SERVER_DATABASE_URL"),
			}),
			logging: Some(LoggingConfigLayer {
				level: env_string("BOULDER_SERVER_LOG_LEVEL"),
			}),
			platform: Some(PlatformConfigLayer {
				uaa_url: env_string("BOULDER_SERVER_PLATFORM_UAA_URL"),
				uaa_client_id: env_string("BOULDER_SERVER_PLATFORM_UAA_CLIENT_ID"),
				capi_url: env_string("BOULDER_SERVER_PLATFORM_CAPI_URL"),
				capi_username: env_string("BOULDER_SERVER_PLATFORM_CAPI_USERNAME"),
				request_timeout_secs: env_parse("BOULDER_SERVER_PLATFORM_REQUEST_TIMEOUT_SECS")?,
			}),
			provisioning: Some(ProvisioningConfigLayer {
				keep_alive: env_string("BOULDER_SERVER_PROVISIONING_KEEP_ALIVE"),
				sweep_enabled: env_parse("BOULDER_SERVER_PROVISIONING_SWEEP_ENABLED")?,
				sweep_interval_secs: env_parse("BOULDER_SERVER_PROVISIONING_SWEEP_INTERVAL_SECS")?,
				retry_attempts: env_parse("BOULDER_SERVER_PROVISIONING_RETRY_ATTEMPTS")?,
			}),
		})
	}
}

fn env_string(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_string(name) {
		None => Ok(None),
		Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
			ConfigError::InvalidValue(format!("{name}={raw} could not be parsed"))
		}),
	}
}

/// Read a secret from the environment into a `SecretString`.
pub fn load_secret_env(name: &str) -> Option<SecretString> {
	env_string(name).map(SecretString::new)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_missing_toml_file_is_empty_layer() {
		let source = TomlSource::new("/nonexistent/boulder-server.toml");
		let layer = source.load().unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn test_toml_file_parses_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[http]\nport = 9090\n\n[provisioning]\nsweep_interval_secs = 5"
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(9090));
		assert_eq!(layer.provisioning.unwrap().sweep_interval_secs, Some(5));
	}

	#[test]
	fn test_invalid_toml_is_an_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}
}
