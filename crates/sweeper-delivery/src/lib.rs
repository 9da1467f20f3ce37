//! Chain access for the sweeper.
//!
//! Each configured chain gets one [`DeliveryInterface`] implementation that
//! reads balances and gas prices, estimates gas and submits transactions.
//! [`DeliveryService`] routes calls to the implementation for a chain id.
//! Signing happens per submission with the signer of the account being
//! processed, so a single implementation serves every account.

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use sweeper_account::AccountSigner;
use sweeper_types::{TokenConfig, Transaction, TransactionReceipt};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during RPC communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when a transaction is mined but reverts.
	#[error("Transaction failed: {0}")]
	TransactionFailed(String),
	/// Error that occurs when no implementation exists for a chain.
	#[error("No implementation available for chain {0}")]
	NoImplementationAvailable(u64),
}

/// Trait defining the interface for per-chain access.
///
/// Implementations are bound to a single chain. Every call is a fresh read;
/// nothing is cached between calls.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait DeliveryInterface: Send + Sync {
	/// Native balance of `address` in wei.
	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError>;

	/// Balances of `owner` for each token, in the order given.
	///
	/// Tokens whose `balanceOf` call fails report zero.
	async fn get_token_balances(
		&self,
		owner: Address,
		tokens: &[TokenConfig],
	) -> Result<Vec<U256>, DeliveryError>;

	/// Current gas price in wei.
	async fn get_gas_price(&self) -> Result<u128, DeliveryError>;

	/// Gas units `tx` would consume when sent from `from`.
	async fn estimate_gas(&self, from: Address, tx: Transaction) -> Result<u64, DeliveryError>;

	/// Signs `tx` with `signer`, broadcasts it and waits for the receipt.
	///
	/// A reverted transaction is reported as [`DeliveryError::TransactionFailed`].
	async fn submit(
		&self,
		signer: &AccountSigner,
		tx: Transaction,
	) -> Result<TransactionReceipt, DeliveryError>;

	/// Executes a read-only call.
	async fn eth_call(&self, tx: Transaction) -> Result<Bytes, DeliveryError>;
}

/// Service that routes chain access to per-chain implementations.
#[derive(Clone, Default)]
pub struct DeliveryService {
	implementations: HashMap<u64, Arc<dyn DeliveryInterface>>,
}

impl DeliveryService {
	pub fn new(implementations: HashMap<u64, Arc<dyn DeliveryInterface>>) -> Self {
		Self { implementations }
	}

	/// Registers (or replaces) the implementation for a chain.
	pub fn insert(&mut self, chain_id: u64, implementation: Arc<dyn DeliveryInterface>) {
		self.implementations.insert(chain_id, implementation);
	}

	/// Gets the implementation for a specific chain ID.
	pub fn chain(&self, chain_id: u64) -> Result<&Arc<dyn DeliveryInterface>, DeliveryError> {
		self.implementations
			.get(&chain_id)
			.ok_or(DeliveryError::NoImplementationAvailable(chain_id))
	}

	pub async fn get_balance(&self, chain_id: u64, address: Address) -> Result<U256, DeliveryError> {
		self.chain(chain_id)?.get_balance(address).await
	}

	pub async fn get_token_balances(
		&self,
		chain_id: u64,
		owner: Address,
		tokens: &[TokenConfig],
	) -> Result<Vec<U256>, DeliveryError> {
		if tokens.is_empty() {
			return Ok(Vec::new());
		}
		self.chain(chain_id)?
			.get_token_balances(owner, tokens)
			.await
	}

	pub async fn get_gas_price(&self, chain_id: u64) -> Result<u128, DeliveryError> {
		self.chain(chain_id)?.get_gas_price().await
	}

	pub async fn estimate_gas(&self, from: Address, tx: Transaction) -> Result<u64, DeliveryError> {
		self.chain(tx.chain_id)?.estimate_gas(from, tx).await
	}

	/// Submits `tx` on the chain named by its `chain_id`.
	pub async fn submit(
		&self,
		signer: &AccountSigner,
		tx: Transaction,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.chain(tx.chain_id)?.submit(signer, tx).await
	}

	pub async fn eth_call(&self, tx: Transaction) -> Result<Bytes, DeliveryError> {
		self.chain(tx.chain_id)?.eth_call(tx).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, B256};
	use alloy_signer_local::PrivateKeySigner;
	use sweeper_types::utils::builders::TransactionBuilder;
	use sweeper_types::TransactionHash;

	fn service_with(chain_id: u64, mock: MockDeliveryInterface) -> DeliveryService {
		let mut implementations: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		implementations.insert(chain_id, Arc::new(mock));
		DeliveryService::new(implementations)
	}

	#[tokio::test]
	async fn test_routes_by_chain_id() {
		let mut mock = MockDeliveryInterface::new();
		mock.expect_get_balance()
			.returning(|_| Box::pin(async { Ok(U256::from(7u64)) }));

		let service = service_with(10, mock);
		let owner = address!("1111111111111111111111111111111111111111");

		assert_eq!(
			service.get_balance(10, owner).await.unwrap(),
			U256::from(7u64)
		);
		assert!(matches!(
			service.get_balance(1, owner).await,
			Err(DeliveryError::NoImplementationAvailable(1))
		));
	}

	#[tokio::test]
	async fn test_submit_uses_transaction_chain() {
		let mut mock = MockDeliveryInterface::new();
		mock.expect_submit()
			.withf(|_, tx| tx.value == U256::from(5u64))
			.times(1)
			.returning(|_, _| {
				Box::pin(async {
					Ok(TransactionReceipt {
						hash: TransactionHash(B256::repeat_byte(1)),
						block_number: 100,
						success: true,
						gas_used: 21_000,
					})
				})
			});

		let service = service_with(8453, mock);
		let signer = AccountSigner::Local(PrivateKeySigner::random());
		let tx = TransactionBuilder::new()
			.chain_id(8453)
			.value(U256::from(5u64))
			.build();

		let receipt = service.submit(&signer, tx).await.unwrap();
		assert_eq!(receipt.block_number, 100);
	}

	#[tokio::test]
	async fn test_empty_token_list_skips_rpc() {
		let mock = MockDeliveryInterface::new();
		let service = service_with(1, mock);
		let balances = service
			.get_token_balances(1, Address::ZERO, &[])
			.await
			.unwrap();
		assert!(balances.is_empty());
	}
}
