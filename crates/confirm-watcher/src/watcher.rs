//! Receipt polling loop.

use crate::Deadline;
use confirm_types::{
	truncate_hash, ConfirmationOutcome, Diagnosis, LedgerClient, LedgerError, Receipt,
	TransactionHandle, WatchError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Interval between two receipt queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Waits for submitted transactions to be mined and classifies the result.
///
/// The watcher holds no per-transaction state, so one instance can serve any
/// number of concurrent [`await_confirmation`](Self::await_confirmation)
/// calls. Each call issues at most one receipt query at a time.
#[derive(Clone)]
pub struct ConfirmationWatcher {
	client: Arc<dyn LedgerClient>,
	poll_interval: Duration,
}

impl ConfirmationWatcher {
	pub fn new(client: Arc<dyn LedgerClient>) -> Self {
		Self {
			client,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	pub fn poll_interval(&self) -> Duration {
		self.poll_interval
	}

	/// Polls for the receipt of `handle` until it is mined or `deadline`
	/// fires.
	///
	/// The deadline is only observed between queries: a query already in
	/// flight runs to completion and its result is honored.
	///
	/// # Errors
	///
	/// Returns [`WatchError::Query`] as soon as a receipt query fails with
	/// anything other than [`LedgerError::NotFound`]. No further queries are
	/// issued after such a failure.
	pub async fn await_confirmation(
		&self,
		handle: &TransactionHandle,
		deadline: &Deadline,
	) -> Result<ConfirmationOutcome, WatchError> {
		let span = info_span!(
			"await_confirmation",
			tx_hash = %truncate_hash(&handle.hash),
			label = handle.label.as_deref().unwrap_or_default(),
		);

		self.poll(handle, deadline).instrument(span).await
	}

	/// Same as [`await_confirmation`](Self::await_confirmation) with a
	/// deadline `timeout` from now.
	pub async fn await_with_timeout(
		&self,
		handle: &TransactionHandle,
		timeout: Duration,
	) -> Result<ConfirmationOutcome, WatchError> {
		self.await_confirmation(handle, &Deadline::after(timeout))
			.await
	}

	/// Watches every handle on its own task under a shared deadline.
	///
	/// Results are returned in the order of `handles`.
	pub async fn watch_all(
		&self,
		handles: Vec<TransactionHandle>,
		deadline: Deadline,
	) -> Vec<Result<ConfirmationOutcome, WatchError>> {
		let tasks: Vec<_> = handles
			.into_iter()
			.map(|handle| {
				let watcher = self.clone();
				let deadline = deadline.clone();
				tokio::spawn(async move { watcher.await_confirmation(&handle, &deadline).await })
			})
			.collect();

		futures::future::join_all(tasks)
			.await
			.into_iter()
			.map(|joined| match joined {
				Ok(result) => result,
				Err(e) => Err(WatchError::Task(e.to_string())),
			})
			.collect()
	}

	async fn poll(
		&self,
		handle: &TransactionHandle,
		deadline: &Deadline,
	) -> Result<ConfirmationOutcome, WatchError> {
		let mut polls: u64 = 0;

		loop {
			// Checked before every wait so a zero interval cannot starve it.
			if deadline.is_expired() {
				warn!(polls, "Deadline reached before a receipt was found");
				return Ok(ConfirmationOutcome::TimedOut);
			}

			tokio::select! {
				biased;
				_ = tokio::time::sleep(self.poll_interval) => {},
				_ = deadline.fired() => {
					warn!(polls, "Deadline reached before a receipt was found");
					return Ok(ConfirmationOutcome::TimedOut);
				}
			}

			polls += 1;
			match self.client.get_receipt(&handle.hash).await {
				Err(LedgerError::NotFound) => {
					debug!(polls, "Receipt not available yet");
				}
				Err(source) => {
					error!(polls, error = %source, "Receipt query failed");
					return Err(WatchError::Query {
						name: handle.display_name(),
						tx_hash: handle.hash,
						source,
					});
				}
				Ok(receipt) if receipt.success => {
					info!(
						block_number = receipt.block_number,
						gas_used = receipt.gas_used,
						"Transaction confirmed"
					);
					return Ok(ConfirmationOutcome::Confirmed(receipt));
				}
				Ok(receipt) => return self.diagnose(handle, receipt).await,
			}
		}
	}

	/// Replays the call at the receipt's block to recover a revert reason.
	async fn diagnose(
		&self,
		handle: &TransactionHandle,
		receipt: Receipt,
	) -> Result<ConfirmationOutcome, WatchError> {
		let block_number = receipt.block_number;

		match self.client.simulate_call(&handle.call, block_number).await {
			Err(e) => {
				let reason = e.to_string();
				warn!(block_number, %reason, "Transaction reverted");
				Ok(ConfirmationOutcome::Failed {
					receipt,
					reason,
					diagnosis: Diagnosis::Reverted,
				})
			}
			Ok(_) => {
				let reason = receipt
					.to_json()
					.map_err(|source| WatchError::Serialization {
						name: handle.display_name(),
						source,
					})?;
				warn!(
					block_number,
					"Transaction failed but replaying it at its block succeeded"
				);
				Ok(ConfirmationOutcome::Failed {
					receipt,
					reason,
					diagnosis: Diagnosis::Inconclusive,
				})
			}
		}
	}
}
