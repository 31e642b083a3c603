//! Transaction handle and receipt types.
//!
//! This module defines what the watcher knows about a transaction that has
//! already been broadcast, and the receipt record the ledger produces once
//! that transaction is mined.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Utility function to truncate a transaction hash for display.
pub fn truncate_hash(hash: &TxHash) -> String {
	let hash_str = hex::encode(hash.0);
	if hash_str.len() <= 8 {
		hash_str
	} else {
		format!("{}..", &hash_str[..8])
	}
}

/// Parameters of the original call, kept so a failed transaction can be
/// replayed as a read-only simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
	/// Sender of the transaction.
	pub from: Address,
	/// Destination, `None` for contract creation.
	pub to: Option<Address>,
	/// Gas limit the transaction was sent with.
	pub gas_limit: u64,
	/// Gas price in wei. For dynamic-fee transactions this is the fee cap.
	pub gas_price: Option<u128>,
	/// Value transferred in wei.
	pub value: U256,
	/// Calldata.
	pub input: Bytes,
}

/// A previously submitted transaction.
///
/// Owned by the caller; the watcher only borrows it for the duration of a
/// single confirmation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
	/// Hash returned when the transaction was broadcast.
	pub hash: TxHash,
	/// Call parameters used for diagnosis on failure.
	pub call: CallRequest,
	/// Operation name used in logs and error messages.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

impl TransactionHandle {
	pub fn new(hash: TxHash, call: CallRequest) -> Self {
		Self {
			hash,
			call,
			label: None,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Label if set, otherwise the truncated hash.
	pub fn display_name(&self) -> String {
		self.label
			.clone()
			.unwrap_or_else(|| truncate_hash(&self.hash))
	}
}

/// Log entry emitted by a mined transaction. Opaque to the watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
}

/// Transaction receipt containing execution details.
///
/// Produced by the remote ledger once the transaction is included in a
/// block. The watcher classifies it by `success` and never modifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
	/// The hash of the transaction.
	pub transaction_hash: TxHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Gas consumed by the transaction.
	pub gas_used: u64,
	/// Logs emitted during execution.
	pub logs: Vec<ReceiptLog>,
}

impl Receipt {
	/// Serializes the modelled receipt fields to JSON. Node-only fields such as
	/// the logs bloom or cumulative gas are not part of `Receipt`.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}
}

impl fmt::Display for Receipt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} in block {} ({})",
			truncate_hash(&self.transaction_hash),
			self.block_number,
			if self.success { "success" } else { "failure" }
		)
	}
}
