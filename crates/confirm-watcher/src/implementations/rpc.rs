//! JSON-RPC ledger client.
//!
//! Implements [`LedgerClient`] on top of an Alloy HTTP provider. Receipts are
//! fetched with `eth_getTransactionReceipt` and failed transactions are
//! replayed with `eth_call` pinned to their inclusion block.

use alloy::consensus::Transaction as _;
use alloy::eips::BlockId;
use alloy::primitives::{Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionInput, TransactionReceipt, TransactionRequest};
use alloy::transports::{RpcError, TransportError};
use async_trait::async_trait;
use confirm_types::{
	truncate_hash, CallRequest, LedgerClient, LedgerError, Receipt, ReceiptLog, TransactionHandle,
};
use tracing::debug;

/// Alloy-based EVM ledger client.
#[derive(Clone)]
pub struct AlloyLedger {
	/// The Alloy provider for blockchain interaction.
	provider: DynProvider,
	/// The chain ID this client is configured for.
	chain_id: u64,
}

impl AlloyLedger {
	/// Creates a client for the HTTP endpoint at `rpc_url`.
	pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self, LedgerError> {
		let url = rpc_url
			.parse()
			.map_err(|e| LedgerError::Rpc(format!("Invalid RPC URL: {}", e)))?;

		let provider = ProviderBuilder::new().connect_http(url).erased();

		Ok(Self { provider, chain_id })
	}

	pub fn from_provider(provider: DynProvider, chain_id: u64) -> Self {
		Self { provider, chain_id }
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Rebuilds the handle of a broadcast transaction from the node.
	///
	/// Dynamic-fee transactions have no gas price; their fee cap is used
	/// instead so the replayed call is priced like the original.
	pub async fn transaction_handle(
		&self,
		hash: TxHash,
		label: Option<String>,
	) -> Result<TransactionHandle, LedgerError> {
		let tx = self
			.provider
			.get_transaction_by_hash(hash)
			.await
			.map_err(|e| LedgerError::Rpc(format!("Failed to get transaction: {}", e)))?
			.ok_or(LedgerError::NotFound)?;

		let from = tx.inner.signer();
		let envelope = tx.inner.inner();
		let call = CallRequest {
			from,
			to: envelope.to(),
			gas_limit: envelope.gas_limit(),
			gas_price: Some(
				envelope
					.gas_price()
					.unwrap_or_else(|| envelope.max_fee_per_gas()),
			),
			value: envelope.value(),
			input: envelope.input().clone(),
		};

		Ok(TransactionHandle {
			hash,
			call,
			label,
		})
	}
}

#[async_trait]
impl LedgerClient for AlloyLedger {
	async fn get_receipt(&self, tx_hash: &TxHash) -> Result<Receipt, LedgerError> {
		let receipt = self
			.provider
			.get_transaction_receipt(*tx_hash)
			.await
			.map_err(|e| LedgerError::Rpc(format!("Failed to get receipt: {}", e)))?;

		match receipt {
			Some(receipt) => convert_receipt(receipt),
			None => {
				debug!(
					tx_hash = %truncate_hash(tx_hash),
					chain_id = self.chain_id,
					"No receipt found (transaction may not be mined yet)"
				);
				Err(LedgerError::NotFound)
			}
		}
	}

	async fn simulate_call(
		&self,
		call: &CallRequest,
		block_number: u64,
	) -> Result<Bytes, LedgerError> {
		self.provider
			.call(to_request(call))
			.block(BlockId::number(block_number))
			.await
			.map_err(classify_call_error)
	}
}

/// Converts an RPC receipt. A receipt without a block number is still
/// pending and is reported as not found.
fn convert_receipt(receipt: TransactionReceipt) -> Result<Receipt, LedgerError> {
	let block_number = receipt.block_number.ok_or(LedgerError::NotFound)?;
	let logs = receipt
		.inner
		.logs()
		.iter()
		.map(|log| ReceiptLog {
			address: log.address(),
			topics: log.topics().to_vec(),
			data: log.data().data.clone(),
		})
		.collect();

	Ok(Receipt {
		transaction_hash: receipt.transaction_hash,
		block_number,
		success: receipt.status(),
		gas_used: receipt.gas_used,
		logs,
	})
}

fn to_request(call: &CallRequest) -> TransactionRequest {
	let mut request = TransactionRequest::default()
		.from(call.from)
		.gas_limit(call.gas_limit)
		.value(call.value)
		.input(TransactionInput::new(call.input.clone()));

	if let Some(to) = call.to {
		request = request.to(to);
	}
	if let Some(gas_price) = call.gas_price {
		request = request.gas_price(gas_price);
	}

	request
}

/// Error responses from the node carry the revert message; anything else is
/// a transport failure.
fn classify_call_error(error: TransportError) -> LedgerError {
	match error {
		RpcError::ErrorResp(payload) => LedgerError::Execution {
			message: payload.message.to_string(),
		},
		other => LedgerError::Rpc(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::{Address, U256};
	use alloy::rpc::json_rpc::ErrorPayload;
	use alloy::transports::TransportErrorKind;

	fn call(to: Option<Address>, gas_price: Option<u128>) -> CallRequest {
		CallRequest {
			from: Address::repeat_byte(0x01),
			to,
			gas_limit: 250_000,
			gas_price,
			value: U256::from(5),
			input: Bytes::from(vec![0x12, 0x34]),
		}
	}

	#[test]
	fn test_to_request_copies_call_parameters() {
		let request = to_request(&call(Some(Address::repeat_byte(0x02)), Some(7)));

		assert_eq!(request.from, Some(Address::repeat_byte(0x01)));
		assert_eq!(request.to, Some(Address::repeat_byte(0x02).into()));
		assert_eq!(request.gas, Some(250_000));
		assert_eq!(request.gas_price, Some(7));
		assert_eq!(request.value, Some(U256::from(5)));
		assert_eq!(
			request.input.input(),
			Some(&Bytes::from(vec![0x12, 0x34]))
		);
	}

	#[test]
	fn test_to_request_leaves_optional_fields_unset() {
		let request = to_request(&call(None, None));

		assert!(request.to.is_none());
		assert!(request.gas_price.is_none());
	}

	#[test]
	fn test_error_response_is_execution_error() {
		let error: TransportError = RpcError::ErrorResp(ErrorPayload {
			code: 3,
			message: "execution reverted: Invalid proof".into(),
			data: None,
		});

		assert_eq!(
			classify_call_error(error),
			LedgerError::Execution {
				message: "execution reverted: Invalid proof".to_string()
			}
		);
	}

	#[test]
	fn test_transport_failure_is_rpc_error() {
		let error = TransportErrorKind::custom_str("connection refused");

		assert!(matches!(classify_call_error(error), LedgerError::Rpc(_)));
	}

	#[test]
	fn test_invalid_url_is_rejected() {
		assert!(matches!(
			AlloyLedger::new("not a url", 1),
			Err(LedgerError::Rpc(_))
		));
	}
}
