//! Builder for Transaction

use crate::account::Transaction;
use alloy_primitives::{Address, U256};

/// Builder for creating `Transaction` instances with a fluent API.
///
/// ```
/// use sweeper_types::utils::builders::TransactionBuilder;
/// use alloy_primitives::{Address, U256};
///
/// let tx = TransactionBuilder::new()
///     .to(Address::repeat_byte(0x12))
///     .value(U256::from(1000))
///     .chain_id(1)
///     .gas_limit(21000)
///     .build();
/// assert_eq!(tx.gas_limit, Some(21000));
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
	to: Option<Address>,
	data: Vec<u8>,
	value: U256,
	chain_id: u64,
	nonce: Option<u64>,
	gas_limit: Option<u64>,
	gas_price: Option<u128>,
	max_fee_per_gas: Option<u128>,
	max_priority_fee_per_gas: Option<u128>,
}

impl Default for TransactionBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl TransactionBuilder {
	/// Creates a new `TransactionBuilder` with default values.
	pub fn new() -> Self {
		Self {
			to: None,
			data: Vec::new(),
			value: U256::ZERO,
			chain_id: 1,
			nonce: None,
			gas_limit: None,
			gas_price: None,
			max_fee_per_gas: None,
			max_priority_fee_per_gas: None,
		}
	}

	pub fn to(mut self, to: Address) -> Self {
		self.to = Some(to);
		self
	}

	pub fn data(mut self, data: Vec<u8>) -> Self {
		self.data = data;
		self
	}

	pub fn value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn nonce(mut self, nonce: u64) -> Self {
		self.nonce = Some(nonce);
		self
	}

	pub fn gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}

	pub fn gas_price(mut self, gas_price: u128) -> Self {
		self.gas_price = Some(gas_price);
		self
	}

	pub fn max_fee_per_gas(mut self, max_fee_per_gas: u128) -> Self {
		self.max_fee_per_gas = Some(max_fee_per_gas);
		self
	}

	pub fn max_priority_fee_per_gas(mut self, fee: u128) -> Self {
		self.max_priority_fee_per_gas = Some(fee);
		self
	}

	pub fn build(self) -> Transaction {
		Transaction {
			to: self.to,
			data: self.data,
			value: self.value,
			chain_id: self.chain_id,
			nonce: self.nonce,
			gas_limit: self.gas_limit,
			gas_price: self.gas_price,
			max_fee_per_gas: self.max_fee_per_gas,
			max_priority_fee_per_gas: self.max_priority_fee_per_gas,
		}
	}
}
