//! Configuration for the FID recovery tool.
//!
//! Loads TOML configuration and validates it before anything connects to a
//! chain: a wrong registry address or chain id would produce signatures
//! that fail on-chain verification, so both are checked up front.

use fid_types::is_valid_address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// The registry deployment to operate against.
	pub registry: RegistryConfig,
	/// Session persistence settings.
	#[serde(default)]
	pub session: SessionConfig,
	/// Submission and confirmation settings.
	#[serde(default)]
	pub submission: SubmissionConfig,
	/// Profile lookup service, if configured.
	pub profiles: Option<ProfilesConfig>,
}

/// The registry deployment: chain, contract, and RPC endpoint.
///
/// The chain id and contract address are baked into every signature's
/// EIP-712 domain; a deployment on another chain must use that chain's
/// values or its verifier will reject everything.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
	/// Chain ID of the registry deployment.
	pub chain_id: u64,
	/// Registry contract address.
	pub address: String,
	/// HTTP RPC endpoint for the chain.
	pub rpc_url: String,
}

/// Which storage backend holds the persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
	/// One file per session field under `storage_path`.
	File,
	/// In-memory only; the session does not survive a restart.
	Memory,
}

/// Session persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Which backend to use.
	#[serde(default = "default_session_backend")]
	pub backend: SessionBackend,
	/// Base directory for the file backend.
	#[serde(default = "default_storage_path")]
	pub storage_path: String,
}

fn default_session_backend() -> SessionBackend {
	SessionBackend::File
}

fn default_storage_path() -> String {
	"./data/session".to_string()
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			backend: default_session_backend(),
			storage_path: default_storage_path(),
		}
	}
}

/// Submission and confirmation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionConfig {
	/// Confirmations required before a transaction counts as final.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	/// Seconds between receipt polls.
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
	/// Seconds before the confirmation watcher gives up with a retryable
	/// error.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
}

fn default_confirmations() -> u64 {
	1
}

fn default_poll_interval_secs() -> u64 {
	7
}

fn default_timeout_secs() -> u64 {
	600
}

impl Default for SubmissionConfig {
	fn default() -> Self {
		Self {
			confirmations: default_confirmations(),
			poll_interval_secs: default_poll_interval_secs(),
			timeout_secs: default_timeout_secs(),
		}
	}
}

/// Profile lookup service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfilesConfig {
	/// Base URL of the profile API.
	pub api_url: String,
	/// API key sent with each request, if the service needs one.
	pub api_key: Option<String>,
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let raw = std::fs::read_to_string(path)?;
		Self::from_toml_str(&raw)
	}

	/// Parses and validates configuration from a TOML string.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.registry.chain_id == 0 {
			return Err(ConfigError::Validation(
				"registry.chain_id must be nonzero".to_string(),
			));
		}
		if !is_valid_address(&self.registry.address) {
			return Err(ConfigError::Validation(format!(
				"registry.address is not a valid address: {}",
				self.registry.address
			)));
		}
		if !self.registry.rpc_url.starts_with("http://")
			&& !self.registry.rpc_url.starts_with("https://")
		{
			return Err(ConfigError::Validation(format!(
				"registry.rpc_url must be an http(s) URL: {}",
				self.registry.rpc_url
			)));
		}
		if self.submission.confirmations == 0 {
			return Err(ConfigError::Validation(
				"submission.confirmations must be at least 1".to_string(),
			));
		}
		if let Some(profiles) = &self.profiles {
			if profiles.api_url.is_empty() {
				return Err(ConfigError::Validation(
					"profiles.api_url must not be empty".to_string(),
				));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[registry]
chain_id = 10
address = "0x00000000fc6c5f01fc30151999387bb99a9f489b"
rpc_url = "https://mainnet.optimism.io"
"#;

	#[test]
	fn minimal_config_gets_defaults() {
		let config = Config::from_toml_str(MINIMAL).unwrap();
		assert_eq!(config.registry.chain_id, 10);
		assert_eq!(config.session.backend, SessionBackend::File);
		assert_eq!(config.session.storage_path, "./data/session");
		assert_eq!(config.submission.confirmations, 1);
		assert_eq!(config.submission.poll_interval_secs, 7);
		assert!(config.profiles.is_none());
	}

	#[test]
	fn full_config_parses() {
		let config = Config::from_toml_str(
			r#"
[registry]
chain_id = 10
address = "0x00000000fc6c5f01fc30151999387bb99a9f489b"
rpc_url = "https://mainnet.optimism.io"

[session]
backend = "memory"

[submission]
confirmations = 3
poll_interval_secs = 2
timeout_secs = 120

[profiles]
api_url = "https://api.example.com"
api_key = "secret"
"#,
		)
		.unwrap();
		assert_eq!(config.session.backend, SessionBackend::Memory);
		assert_eq!(config.submission.confirmations, 3);
		assert_eq!(config.profiles.unwrap().api_key.as_deref(), Some("secret"));
	}

	#[test]
	fn zero_chain_id_is_rejected() {
		let err = Config::from_toml_str(
			r#"
[registry]
chain_id = 0
address = "0x00000000fc6c5f01fc30151999387bb99a9f489b"
rpc_url = "https://mainnet.optimism.io"
"#,
		)
		.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn malformed_registry_address_is_rejected() {
		let err = Config::from_toml_str(
			r#"
[registry]
chain_id = 10
address = "not-an-address"
rpc_url = "https://mainnet.optimism.io"
"#,
		)
		.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn non_http_rpc_url_is_rejected() {
		let err = Config::from_toml_str(
			r#"
[registry]
chain_id = 10
address = "0x00000000fc6c5f01fc30151999387bb99a9f489b"
rpc_url = "ipc:///tmp/geth.ipc"
"#,
		)
		.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}
}
