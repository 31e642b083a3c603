//! Configuration loading from files and environment.

use crate::types::TxConfirmConfig;
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a configuration cannot be turned into a usable watcher setup.
#[derive(Error, Debug)]
pub enum ConfigError {
	/// `load` was called without `with_file`.
	#[error("No configuration file specified")]
	NoFile,

	#[error("Configuration file not found: {}", .0.display())]
	MissingFile(PathBuf),

	/// The file exists but could not be read (permissions, not UTF-8, ...).
	#[error("Failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid TOML: {0}")]
	Parse(String),

	/// A `${VAR}` reference names an unset environment variable.
	#[error("Environment variable {0} referenced by the configuration is not set")]
	MissingEnvVar(String),

	/// A `TX_CONFIRM_*` override holds a value of the wrong type.
	#[error("Invalid value in {var}: {reason}")]
	InvalidOverride { var: String, reason: String },

	/// Parsed values that cannot drive a watcher.
	#[error("Invalid configuration: {0}")]
	Invalid(String),
}

/// Builds a [`TxConfirmConfig`] from a TOML file and the process
/// environment.
///
/// Variables named `<prefix>LOG_LEVEL`, `<prefix>RPC_URL` and
/// `<prefix>POLL_INTERVAL_MS` override the file. Their names are recorded in
/// [`TxConfirmConfig::env_overrides`] so the caller can log them once
/// tracing is installed.
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	/// Loader with the `TX_CONFIRM_` override prefix and no file.
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "TX_CONFIRM_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<TxConfirmConfig, ConfigError> {
		let path = self.file_path.as_ref().ok_or(ConfigError::NoFile)?;

		let content = tokio::fs::read_to_string(path)
			.await
			.map_err(|source| match source.kind() {
				std::io::ErrorKind::NotFound => ConfigError::MissingFile(path.clone()),
				_ => ConfigError::Read {
					path: path.clone(),
					source,
				},
			})?;

		self.load_from_str(&content)
	}

	/// Parses TOML content, then applies substitution, overrides and
	/// validation exactly as [`load`](Self::load) does.
	pub fn load_from_str(&self, content: &str) -> Result<TxConfirmConfig, ConfigError> {
		let substituted = substitute_env_vars(content)?;

		let mut config: TxConfirmConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::Parse(e.to_string()))?;

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	fn apply_env_overrides(&self, config: &mut TxConfirmConfig) -> Result<(), ConfigError> {
		let var = |name: &str| format!("{}{}", self.env_prefix, name);

		let log_level_var = var("LOG_LEVEL");
		if let Ok(log_level) = env::var(&log_level_var) {
			config.logging.level = log_level;
			config.env_overrides.push(log_level_var);
		}

		let rpc_url_var = var("RPC_URL");
		if let Ok(rpc_url) = env::var(&rpc_url_var) {
			config.chain.rpc_url = rpc_url;
			config.env_overrides.push(rpc_url_var);
		}

		let interval_var = var("POLL_INTERVAL_MS");
		if let Ok(interval) = env::var(&interval_var) {
			config.watcher.poll_interval_ms = interval.parse().map_err(
				|e: std::num::ParseIntError| ConfigError::InvalidOverride {
					var: interval_var.clone(),
					reason: e.to_string(),
				},
			)?;
			config.env_overrides.push(interval_var);
		}

		Ok(())
	}
}

/// Replaces `${VAR_NAME}` patterns with environment values.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Parse(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let env_value =
			env::var(var_name).map_err(|_| ConfigError::MissingEnvVar(var_name.to_string()))?;

		result = result.replace(full_match, &env_value);
	}

	Ok(result)
}

fn validate_config(config: &TxConfirmConfig) -> Result<(), ConfigError> {
	let url = &config.chain.rpc_url;
	if !(url.starts_with("http://") || url.starts_with("https://")) {
		return Err(ConfigError::Invalid(
			"RPC URL must start with http:// or https://".to_string(),
		));
	}

	if config.chain.chain_id == 0 {
		return Err(ConfigError::Invalid(
			"chain_id must be greater than 0".to_string(),
		));
	}

	if config.watcher.default_timeout_secs == 0 {
		return Err(ConfigError::Invalid(
			"default_timeout_secs must be greater than 0".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::LogFormat;
	use std::io::Write;
	use std::time::Duration;

	const MINIMAL: &str = r#"
[chain]
name = "local"
rpc_url = "http://localhost:8545"
chain_id = 31337
"#;

	fn loader() -> ConfigLoader {
		// Unique prefix so overrides set by other tests do not leak in
		ConfigLoader::new().with_env_prefix("TX_CONFIRM_UNUSED_TEST_")
	}

	#[test]
	fn test_defaults_applied() {
		let config = loader().load_from_str(MINIMAL).unwrap();

		assert_eq!(config.chain.name, "local");
		assert_eq!(config.watcher.poll_interval(), Duration::from_secs(1));
		assert_eq!(config.watcher.default_timeout(), Duration::from_secs(300));
		assert_eq!(config.logging.level, "info");
		assert_eq!(config.logging.format, LogFormat::Pretty);
	}

	#[test]
	fn test_full_config_parsing() {
		let toml = r#"
[watcher]
poll_interval_ms = 250
default_timeout_secs = 60

[chain]
name = "sepolia"
rpc_url = "https://rpc.sepolia.org"
chain_id = 11155111

[logging]
level = "debug"
format = "json"
"#;
		let config = loader().load_from_str(toml).unwrap();

		assert_eq!(config.watcher.poll_interval(), Duration::from_millis(250));
		assert_eq!(config.watcher.default_timeout_secs, 60);
		assert_eq!(config.chain.chain_id, 11155111);
		assert_eq!(config.logging.format, LogFormat::Json);
	}

	#[test]
	fn test_env_substitution() {
		env::set_var("TX_CONFIRM_TEST_SUBST_URL", "http://node:8545");
		let toml = MINIMAL.replace("http://localhost:8545", "${TX_CONFIRM_TEST_SUBST_URL}");

		let config = loader().load_from_str(&toml).unwrap();
		assert_eq!(config.chain.rpc_url, "http://node:8545");
	}

	#[test]
	fn test_missing_env_var() {
		let toml = MINIMAL.replace("http://localhost:8545", "${TX_CONFIRM_TEST_MISSING_VAR}");

		let err = loader().load_from_str(&toml).unwrap_err();
		assert!(matches!(err, ConfigError::MissingEnvVar(name) if name == "TX_CONFIRM_TEST_MISSING_VAR"));
	}

	#[test]
	fn test_env_overrides() {
		env::set_var("TX_CONFIRM_OVR_TEST_LOG_LEVEL", "trace");
		env::set_var("TX_CONFIRM_OVR_TEST_POLL_INTERVAL_MS", "50");

		let config = ConfigLoader::new()
			.with_env_prefix("TX_CONFIRM_OVR_TEST_")
			.load_from_str(MINIMAL)
			.unwrap();

		assert_eq!(config.logging.level, "trace");
		assert_eq!(config.watcher.poll_interval_ms, 50);
		assert_eq!(
			config.env_overrides,
			vec![
				"TX_CONFIRM_OVR_TEST_LOG_LEVEL".to_string(),
				"TX_CONFIRM_OVR_TEST_POLL_INTERVAL_MS".to_string(),
			]
		);
	}

	#[test]
	fn test_no_overrides_recorded_without_env() {
		let config = loader().load_from_str(MINIMAL).unwrap();
		assert!(config.env_overrides.is_empty());
	}

	#[test]
	fn test_invalid_poll_interval_override() {
		env::set_var("TX_CONFIRM_BAD_TEST_POLL_INTERVAL_MS", "soon");

		let err = ConfigLoader::new()
			.with_env_prefix("TX_CONFIRM_BAD_TEST_")
			.load_from_str(MINIMAL)
			.unwrap_err();
		assert!(matches!(
			err,
			ConfigError::InvalidOverride { ref var, .. } if var == "TX_CONFIRM_BAD_TEST_POLL_INTERVAL_MS"
		));
	}

	#[test]
	fn test_validation_rejects_bad_values() {
		let bad_url = MINIMAL.replace("http://localhost:8545", "ws://localhost:8546");
		assert!(matches!(
			loader().load_from_str(&bad_url),
			Err(ConfigError::Invalid(_))
		));

		let bad_chain = MINIMAL.replace("31337", "0");
		assert!(matches!(
			loader().load_from_str(&bad_chain),
			Err(ConfigError::Invalid(_))
		));

		let zero_timeout = format!("{}\n[watcher]\ndefault_timeout_secs = 0\n", MINIMAL);
		assert!(matches!(
			loader().load_from_str(&zero_timeout),
			Err(ConfigError::Invalid(_))
		));
	}

	#[test]
	fn test_unknown_log_format_is_parse_error() {
		let toml = format!("{}\n[logging]\nformat = \"xml\"\n", MINIMAL);
		assert!(matches!(
			loader().load_from_str(&toml),
			Err(ConfigError::Parse(_))
		));
	}

	#[tokio::test]
	async fn test_load_from_file() {
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		file.write_all(MINIMAL.as_bytes()).unwrap();

		let config = loader().with_file(file.path()).load().await.unwrap();
		assert_eq!(config.chain.chain_id, 31337);
	}

	#[tokio::test]
	async fn test_missing_file() {
		let err = loader()
			.with_file("/nonexistent/tx-confirm.toml")
			.load()
			.await
			.unwrap_err();
		assert!(matches!(err, ConfigError::MissingFile(_)));

		let err = loader().load().await.unwrap_err();
		assert!(matches!(err, ConfigError::NoFile));
	}

	#[tokio::test]
	async fn test_unreadable_path_is_read_error() {
		let dir = tempfile::tempdir().unwrap();

		let err = loader().with_file(dir.path()).load().await.unwrap_err();
		assert!(matches!(err, ConfigError::Read { .. }));
	}
}
