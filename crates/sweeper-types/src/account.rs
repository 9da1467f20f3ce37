//! Transaction representation shared by the delivery, bridge and swap layers.
//!
//! Bridge quote services and swap routers hand back loosely typed payloads;
//! everything is normalised into [`Transaction`] before it reaches the
//! delivery layer so gas estimation and submission see one shape.

use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use serde::{Deserialize, Serialize};

/// Blockchain transaction representation.
///
/// Contains all fields necessary for estimating and submitting a transaction
/// on an EVM network. Optional fee fields are filled by the provider when
/// left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Recipient address.
	pub to: Option<Address>,
	/// Transaction data/calldata.
	pub data: Vec<u8>,
	/// Value to transfer in native currency.
	pub value: U256,
	/// Chain ID for replay protection.
	pub chain_id: u64,
	/// Transaction nonce (optional, can be filled by provider).
	pub nonce: Option<u64>,
	/// Gas limit for transaction execution.
	pub gas_limit: Option<u64>,
	/// Legacy gas price (for non-EIP-1559 transactions).
	pub gas_price: Option<u128>,
	/// Maximum fee per gas (EIP-1559).
	pub max_fee_per_gas: Option<u128>,
	/// Maximum priority fee per gas (EIP-1559).
	pub max_priority_fee_per_gas: Option<u128>,
}

impl Transaction {
	/// Plain native transfer with no calldata.
	pub fn transfer(chain_id: u64, to: Address, value: U256) -> Self {
		Self {
			to: Some(to),
			data: Vec::new(),
			value,
			chain_id,
			nonce: None,
			gas_limit: None,
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
		}
	}

	/// Returns a copy carrying a different value.
	///
	/// Used for gas probes, which must not depend on the real transfer value.
	pub fn with_value(&self, value: U256) -> Self {
		Self {
			value,
			..self.clone()
		}
	}

	/// Price per gas unit the payload was quoted with, if any.
	///
	/// Prefers the legacy price and falls back to the EIP-1559 fee cap.
	pub fn quoted_gas_price(&self) -> Option<u128> {
		self.gas_price.or(self.max_fee_per_gas)
	}
}

/// Conversion from our Transaction type to Alloy's TransactionRequest.
impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		TransactionRequest {
			chain_id: Some(tx.chain_id),
			value: Some(tx.value),
			to: tx.to.map(TxKind::Call),
			nonce: tx.nonce,
			gas: tx.gas_limit,
			gas_price: tx.gas_price,
			max_fee_per_gas: tx.max_fee_per_gas,
			max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
			input: TransactionInput::new(Bytes::from(tx.data)),
			..Default::default()
		}
	}
}
