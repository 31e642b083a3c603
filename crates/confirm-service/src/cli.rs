//! Command-line interface definitions.

use alloy::primitives::TxHash;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tx-confirm")]
#[command(about = "Wait for submitted transactions and report how they ended", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", env = "TX_CONFIRM_CONFIG", default_value = "config/local.toml")]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "TX_CONFIRM_LOG_LEVEL")]
	pub log_level: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Watch one or more transactions until they are mined or time out
	Watch(WatchArgs),
	/// Validate the configuration file
	Validate,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
	/// Transaction hashes to watch
	#[arg(required = true)]
	pub hashes: Vec<TxHash>,

	/// Seconds to wait before giving up (defaults to the configured timeout)
	#[arg(short, long)]
	pub timeout_secs: Option<u64>,

	/// Operation name shown in logs and errors
	#[arg(long)]
	pub label: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	const HASH: &str = "0x4a7b0d0b1b2b9b8e7f4c3b2a1908f7e6d5c4b3a29180f7e6d5c4b3a291807f6e";

	#[test]
	fn test_parse_watch() {
		let cli = Cli::try_parse_from([
			"tx-confirm",
			"--config",
			"custom.toml",
			"watch",
			HASH,
			"--timeout-secs",
			"30",
			"--label",
			"createChain",
		])
		.unwrap();

		assert_eq!(cli.config, PathBuf::from("custom.toml"));
		match cli.command {
			Command::Watch(args) => {
				assert_eq!(args.hashes, vec![HASH.parse::<TxHash>().unwrap()]);
				assert_eq!(args.timeout_secs, Some(30));
				assert_eq!(args.label.as_deref(), Some("createChain"));
			}
			other => panic!("Expected watch command, got {:?}", other),
		}
	}

	#[test]
	fn test_watch_requires_a_hash() {
		assert!(Cli::try_parse_from(["tx-confirm", "watch"]).is_err());
	}

	#[test]
	fn test_watch_rejects_malformed_hash() {
		assert!(Cli::try_parse_from(["tx-confirm", "watch", "0x1234"]).is_err());
	}

	#[test]
	fn test_parse_validate() {
		let cli = Cli::try_parse_from(["tx-confirm", "validate"]).unwrap();
		assert!(matches!(cli.command, Command::Validate));
	}
}
