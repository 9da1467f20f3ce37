//! Cross-chain bridge backends.
//!
//! A backend turns "move this much native value from chain A to chain B" into
//! a fee quote and a transaction payload. Routing across candidate chains,
//! fee deduction and gas reservation live in the core crate; backends only
//! quote and rebuild payloads.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use sweeper_delivery::DeliveryError;
use sweeper_types::{BridgeQuote, Transaction};
use thiserror::Error;

/// Relay HTTP API client and wire models.
pub mod relay_api;

/// Re-export implementations
pub mod implementations {
	pub mod relay;
	pub mod stargate;
}

pub use implementations::relay::RelayBridge;
pub use implementations::stargate::StargateBridge;
pub use relay_api::RelayApiClient;

/// Errors that can occur during bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// Error that occurs when the quote service cannot be reached or rejects the request.
	#[error("HTTP error: {0}")]
	Http(String),
	/// Error that occurs when a quote cannot be interpreted.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// Error that occurs when a chain has no deployment for this bridge.
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(u64),
	/// Error that occurs when an on-chain quote call fails.
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
}

/// Parameters of a single quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRequest {
	/// Account paying for the bridge.
	pub user: Address,
	/// Receiver on the destination chain.
	pub recipient: Address,
	pub from_chain_id: u64,
	pub to_chain_id: u64,
	/// Amount to deliver, in wei of the source chain's native currency.
	pub amount: U256,
}

/// Trait defining the interface for bridge backends.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait BridgeInterface: Send + Sync {
	/// Short name used in log lines, e.g. "relay".
	fn name(&self) -> &'static str;

	/// Native currency the backend can move. Chains with another native
	/// currency are rejected before any quote is requested.
	fn currency(&self) -> &'static str;

	/// Fee guesses subtracted from the amount before the first quote, tried in
	/// order until one leaves a positive amount. Empty means the first quote
	/// is requested for the full amount.
	fn fee_guesses(&self) -> Vec<U256>;

	/// Requests a quote for `request`.
	async fn quote(&self, request: &BridgeRequest) -> Result<BridgeQuote, BridgeError>;

	/// Rebuilds the quoted transaction so that it carries `value` in total.
	fn adjust(&self, quote: &BridgeQuote, value: U256) -> Result<Transaction, BridgeError>;

	/// Transaction used to estimate gas for `quote`. It carries a nominal
	/// value so the estimate does not depend on the balance being bridged.
	fn gas_probe(&self, quote: &BridgeQuote) -> Result<Transaction, BridgeError> {
		Ok(quote.transaction.with_value(U256::from(PROBE_VALUE)))
	}
}

/// Nominal value of a gas probe, 1 gwei.
pub const PROBE_VALUE: u64 = 1_000_000_000;
