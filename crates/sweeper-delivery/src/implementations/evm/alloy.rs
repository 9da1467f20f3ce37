//! Alloy-backed chain access.
//!
//! One [`AlloyDelivery`] wraps the RPC client of one chain. Reads go through a
//! shared provider; submissions build a wallet provider on top of the same
//! client with the signer of the account being processed.

use crate::{DeliveryError, DeliveryInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{address, Address, Bytes, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use alloy_transport::layers::RetryBackoffLayer;
use async_trait::async_trait;
use std::time::Duration;
use sweeper_account::AccountSigner;
use sweeper_types::{Chain, TokenConfig, Transaction, TransactionHash, TransactionReceipt};

/// Multicall3 is deployed at the same address on every supported chain.
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

const RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);

sol! {
	struct Multicall3Call {
		address target;
		bool allowFailure;
		bytes callData;
	}

	struct Multicall3Result {
		bool success;
		bytes returnData;
	}

	function aggregate3(Multicall3Call[] calldata calls)
		external
		payable
		returns (Multicall3Result[] memory returnData);

	function balanceOf(address owner) external view returns (uint256);
}

/// Alloy-based EVM delivery implementation for a single chain.
pub struct AlloyDelivery {
	chain_id: u64,
	chain_name: String,
	client: RpcClient,
	provider: DynProvider,
}

impl AlloyDelivery {
	/// Creates a delivery for `chain` using its first RPC URL.
	pub fn new(chain: &Chain) -> Result<Self, DeliveryError> {
		let http_url = chain.http_url().ok_or_else(|| {
			DeliveryError::Network(format!("No HTTP RPC URL configured for {}", chain.name))
		})?;

		let url = http_url.parse().map_err(|e| {
			DeliveryError::Network(format!("Invalid RPC URL for {}: {}", chain.name, e))
		})?;

		// Configure retry layer for handling network errors and rate limits
		let retry_layer = RetryBackoffLayer::new(
			5,    // max_retry: retry up to 5 times
			1000, // backoff: initial backoff in milliseconds
			10,   // cups: compute units per second
		);

		let client = RpcClient::builder().layer(retry_layer).http(url);
		let provider = ProviderBuilder::new()
			.connect_client(client.clone())
			.erased();

		Ok(Self {
			chain_id: chain.chain_id,
			chain_name: chain.name.clone(),
			client,
			provider,
		})
	}

	fn request(&self, tx: Transaction) -> TransactionRequest {
		let mut request: TransactionRequest = tx.into();
		request.chain_id = Some(self.chain_id);
		request
	}
}

/// Decodes an `aggregate3` response into one balance per token.
///
/// Failed or short sub-calls count as zero.
pub(crate) fn decode_balances(raw: &[u8], expected: usize) -> Result<Vec<U256>, DeliveryError> {
	let results = aggregate3Call::abi_decode_returns(raw)
		.map_err(|e| DeliveryError::Network(format!("Failed to decode multicall result: {}", e)))?;

	if results.len() != expected {
		return Err(DeliveryError::Network(format!(
			"Multicall returned {} results for {} calls",
			results.len(),
			expected
		)));
	}

	Ok(results
		.into_iter()
		.map(|result| {
			if !result.success {
				return U256::ZERO;
			}
			balanceOfCall::abi_decode_returns(&result.returnData).unwrap_or(U256::ZERO)
		})
		.collect())
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get balance: {}", e)))
	}

	async fn get_token_balances(
		&self,
		owner: Address,
		tokens: &[TokenConfig],
	) -> Result<Vec<U256>, DeliveryError> {
		let calls = tokens
			.iter()
			.map(|token| Multicall3Call {
				target: token.address,
				allowFailure: true,
				callData: balanceOfCall { owner }.abi_encode().into(),
			})
			.collect();

		let request = TransactionRequest::default()
			.to(MULTICALL3_ADDRESS)
			.input(Bytes::from(aggregate3Call { calls }.abi_encode()).into());

		let raw = self.provider.call(request).await.map_err(|e| {
			DeliveryError::Network(format!(
				"Multicall failed on {}: {}",
				self.chain_name, e
			))
		})?;

		decode_balances(&raw, tokens.len())
	}

	/// Gets the current gas price for the network in wei.
	async fn get_gas_price(&self) -> Result<u128, DeliveryError> {
		self.provider
			.get_gas_price()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get gas price: {}", e)))
	}

	async fn estimate_gas(&self, from: Address, tx: Transaction) -> Result<u64, DeliveryError> {
		let request = self.request(tx).from(from);
		self.provider
			.estimate_gas(request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to estimate gas: {}", e)))
	}

	async fn submit(
		&self,
		signer: &AccountSigner,
		tx: Transaction,
	) -> Result<TransactionReceipt, DeliveryError> {
		let from = signer.address();
		let wallet = EthereumWallet::from(signer.clone().with_chain_id(Some(self.chain_id)));
		let provider = ProviderBuilder::new()
			.wallet(wallet)
			.connect_client(self.client.clone());

		let request = self.request(tx).from(from);

		tracing::debug!(
			chain = %self.chain_name,
			to = ?request.to,
			value = ?request.value,
			data_len = request.input.input().map(|d| d.len()).unwrap_or(0),
			gas_limit = ?request.gas,
			"Sending transaction"
		);

		let pending = provider.send_transaction(request).await.map_err(|e| {
			tracing::error!(chain = %self.chain_name, "Transaction submission failed: {}", e);
			DeliveryError::Network(format!("Failed to send transaction: {}", e))
		})?;

		let tx_hash = TransactionHash(*pending.tx_hash());
		tracing::debug!(chain = %self.chain_name, tx_hash = %tx_hash, "Waiting for receipt");

		let receipt = pending
			.with_timeout(Some(RECEIPT_TIMEOUT))
			.get_receipt()
			.await
			.map_err(|e| {
				DeliveryError::Network(format!("Failed to confirm transaction {}: {}", tx_hash, e))
			})?;

		if !receipt.status() {
			return Err(DeliveryError::TransactionFailed(format!(
				"Transaction {} reverted on {}",
				tx_hash, self.chain_name
			)));
		}

		Ok(TransactionReceipt {
			hash: TransactionHash(receipt.transaction_hash),
			block_number: receipt.block_number.unwrap_or(0),
			success: true,
			gas_used: receipt.gas_used,
		})
	}

	async fn eth_call(&self, tx: Transaction) -> Result<Bytes, DeliveryError> {
		let request = self.request(tx);
		self.provider
			.call(request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Call failed: {}", e)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_sol_types::SolValue;
	use sweeper_types::utils::builders::ChainBuilder;

	fn encode_results(results: Vec<Multicall3Result>) -> Vec<u8> {
		(results,).abi_encode_params()
	}

	#[test]
	fn test_decode_balances_zeroes_failures() {
		let raw = encode_results(vec![
			Multicall3Result {
				success: true,
				returnData: U256::from(1_500_000u64).to_be_bytes::<32>().to_vec().into(),
			},
			Multicall3Result {
				success: false,
				returnData: Bytes::new(),
			},
			Multicall3Result {
				success: true,
				returnData: vec![0u8; 4].into(),
			},
		]);

		let balances = decode_balances(&raw, 3).unwrap();
		assert_eq!(
			balances,
			vec![U256::from(1_500_000u64), U256::ZERO, U256::ZERO]
		);
	}

	#[test]
	fn test_decode_balances_length_mismatch() {
		let raw = encode_results(vec![]);
		assert!(decode_balances(&raw, 2).is_err());
	}

	#[test]
	fn test_new_requires_rpc_url() {
		let mut chain = ChainBuilder::new("Nowhere", 999).build();
		chain.rpc_urls.clear();
		assert!(matches!(
			AlloyDelivery::new(&chain),
			Err(DeliveryError::Network(_))
		));
	}

	#[tokio::test]
	async fn test_new_with_rpc_url() {
		let chain = ChainBuilder::new("Local", 31337)
			.rpc_url("http://127.0.0.1:8545")
			.build();
		let delivery = AlloyDelivery::new(&chain).unwrap();
		assert_eq!(delivery.chain_id, 31337);
	}
}
