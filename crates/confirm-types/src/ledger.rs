//! Read-only access to the remote ledger.

use crate::{CallRequest, LedgerError, Receipt};
use alloy::primitives::{Bytes, TxHash};
use async_trait::async_trait;

/// Read-only queries the watcher issues against a chain.
///
/// Implementations must tolerate concurrent calls; several confirmation
/// attempts can share one client.
#[async_trait]
pub trait LedgerClient: Send + Sync {
	/// Fetches the receipt of a transaction.
	///
	/// Returns [`LedgerError::NotFound`] while the transaction is not mined,
	/// and only in that case.
	async fn get_receipt(&self, tx_hash: &TxHash) -> Result<Receipt, LedgerError>;

	/// Executes `call` as a read-only simulation against the state of
	/// `block_number`.
	async fn simulate_call(&self, call: &CallRequest, block_number: u64)
		-> Result<Bytes, LedgerError>;
}
