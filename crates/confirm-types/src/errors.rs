//! Error types for transaction confirmation.

use alloy::primitives::TxHash;
use thiserror::Error;

/// Errors returned by a [`LedgerClient`](crate::LedgerClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
	/// The ledger does not know the transaction yet. Expected while a
	/// transaction is pending.
	#[error("not found")]
	NotFound,

	/// The node executed the call and reported an error, typically a revert.
	#[error("{message}")]
	Execution { message: String },

	/// Transport or RPC failure.
	#[error("RPC error: {0}")]
	Rpc(String),
}

impl LedgerError {
	pub fn is_not_found(&self) -> bool {
		matches!(self, LedgerError::NotFound)
	}
}

/// Hard failures of a confirmation attempt.
///
/// Outcomes such as a revert or a deadline expiry are not errors; they are
/// reported through [`ConfirmationOutcome`](crate::ConfirmationOutcome).
#[derive(Error, Debug)]
pub enum WatchError {
	#[error("Failed to query receipt for {name} ({tx_hash}): {source}")]
	Query {
		name: String,
		tx_hash: TxHash,
		#[source]
		source: LedgerError,
	},

	#[error("Failed to serialize receipt for {name}: {source}")]
	Serialization {
		name: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("Watch task failed: {0}")]
	Task(String),
}
