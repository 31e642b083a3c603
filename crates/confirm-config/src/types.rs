//! Configuration types for the confirmation service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TxConfirmConfig {
	/// Polling behaviour
	#[serde(default)]
	pub watcher: WatcherSettings,
	/// Chain to watch
	pub chain: ChainConfig,
	/// Log output
	#[serde(default)]
	pub logging: LoggingConfig,
	/// Environment variables that overrode file values, filled by the loader
	#[serde(skip)]
	pub env_overrides: Vec<String>,
}

/// Polling settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatcherSettings {
	/// Interval between receipt queries in milliseconds
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Deadline applied when the caller does not provide one
	#[serde(default = "default_timeout_secs")]
	pub default_timeout_secs: u64,
}

impl WatcherSettings {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn default_timeout(&self) -> Duration {
		Duration::from_secs(self.default_timeout_secs)
	}
}

impl Default for WatcherSettings {
	fn default() -> Self {
		Self {
			poll_interval_ms: default_poll_interval_ms(),
			default_timeout_secs: default_timeout_secs(),
		}
	}
}

/// Chain-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// Chain name for logging
	pub name: String,
	/// RPC endpoint URL
	pub rpc_url: String,
	/// Chain ID
	pub chain_id: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
	/// Default filter when `RUST_LOG` is not set
	#[serde(default = "default_log_level")]
	pub level: String,
	#[serde(default)]
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			format: LogFormat::default(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

fn default_poll_interval_ms() -> u64 {
	1000
}

fn default_timeout_secs() -> u64 {
	300
}

fn default_log_level() -> String {
	"info".to_string()
}
