use anyhow::{Context, Result};
use clap::Parser;
use confirm_config::{ConfigLoader, LogFormat, LoggingConfig, TxConfirmConfig};
use confirm_types::{ConfirmationOutcome, WatchError};
use confirm_watcher::{AlloyLedger, ConfirmationWatcher, Deadline};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Command, WatchArgs};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	setup_tracing(&config.logging, cli.log_level.as_deref())?;
	for var in &config.env_overrides {
		debug!("Configuration value overridden by {}", var);
	}

	match cli.command {
		Command::Watch(args) => {
			if !watch(config, args).await? {
				std::process::exit(1);
			}
			Ok(())
		}
		Command::Validate => {
			info!("Configuration is valid");
			info!("Chain: {} ({})", config.chain.name, config.chain.chain_id);
			info!("Poll interval: {:?}", config.watcher.poll_interval());
			info!("Default timeout: {:?}", config.watcher.default_timeout());
			Ok(())
		}
	}
}

/// Returns whether every transaction was confirmed.
async fn watch(config: TxConfirmConfig, args: WatchArgs) -> Result<bool> {
	let ledger = Arc::new(
		AlloyLedger::new(&config.chain.rpc_url, config.chain.chain_id)
			.context("Failed to create ledger client")?,
	);

	let mut handles = Vec::with_capacity(args.hashes.len());
	for hash in &args.hashes {
		let handle = ledger
			.transaction_handle(*hash, args.label.clone())
			.await
			.with_context(|| format!("Failed to fetch transaction {}", hash))?;
		handles.push(handle);
	}

	let timeout = args
		.timeout_secs
		.map(Duration::from_secs)
		.unwrap_or_else(|| config.watcher.default_timeout());
	let token = CancellationToken::new();
	let deadline = Deadline::after(timeout).with_cancellation(token.clone());

	tokio::spawn(async move {
		shutdown_signal().await;
		info!("Shutdown signal received, cancelling watches");
		token.cancel();
	});

	info!(
		"Watching {} transaction(s) on {} (timeout: {}s)",
		handles.len(),
		config.chain.name,
		timeout.as_secs()
	);

	let watcher =
		ConfirmationWatcher::new(ledger).with_poll_interval(config.watcher.poll_interval());
	let results = watcher.watch_all(handles, deadline).await;

	let mut all_confirmed = true;
	for (hash, result) in args.hashes.iter().zip(results) {
		println!("{}", report_line(&hash.to_string(), &result));
		all_confirmed &= matches!(result, Ok(ConfirmationOutcome::Confirmed(_)));
	}

	Ok(all_confirmed)
}

fn report_line(hash: &str, result: &Result<ConfirmationOutcome, WatchError>) -> String {
	match result {
		Ok(ConfirmationOutcome::Confirmed(receipt)) => {
			format!("{} confirmed in block {}", hash, receipt.block_number)
		}
		Ok(ConfirmationOutcome::Failed {
			receipt, reason, ..
		}) => format!(
			"{} failed in block {}: {}",
			hash, receipt.block_number, reason
		),
		Ok(ConfirmationOutcome::TimedOut) => format!("{} timed out", hash),
		Err(e) => format!("{} error: {}", hash, e),
	}
}

fn setup_tracing(logging: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
	let level = level_override.unwrap_or(logging.level.as_str());
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

	let registry = tracing_subscriber::registry().with(env_filter);
	let initialized = match logging.format {
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer())
			.try_init(),
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init(),
	};

	initialized.context("Failed to initialize tracing")
}

async fn setup_ctrl_c() {
	if let Err(e) = signal::ctrl_c().await {
		warn!("Failed to install Ctrl+C handler: {}", e);
		std::future::pending::<()>().await;
	}
}

async fn shutdown_signal() {
	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				warn!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = setup_ctrl_c() => {},
		_ = terminate => {},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::TxHash;
	use confirm_types::{Diagnosis, LedgerError, Receipt};

	fn receipt(success: bool) -> Receipt {
		Receipt {
			transaction_hash: TxHash::ZERO,
			block_number: 99,
			success,
			gas_used: 21_000,
			logs: vec![],
		}
	}

	#[test]
	fn test_report_lines() {
		assert_eq!(
			report_line("0xab", &Ok(ConfirmationOutcome::Confirmed(receipt(true)))),
			"0xab confirmed in block 99"
		);
		assert_eq!(
			report_line(
				"0xab",
				&Ok(ConfirmationOutcome::Failed {
					receipt: receipt(false),
					reason: "execution reverted".to_string(),
					diagnosis: Diagnosis::Reverted,
				})
			),
			"0xab failed in block 99: execution reverted"
		);
		assert_eq!(
			report_line("0xab", &Ok(ConfirmationOutcome::TimedOut)),
			"0xab timed out"
		);

		let err = WatchError::Query {
			name: "transfer".to_string(),
			tx_hash: TxHash::ZERO,
			source: LedgerError::Rpc("connection refused".to_string()),
		};
		assert!(report_line("0xab", &Err(err)).starts_with("0xab error: Failed to query receipt"));
	}
}
