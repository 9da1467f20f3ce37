//! Token-to-native swaps.
//!
//! The sweeper only needs one capability from a swap venue: sell the whole
//! balance of a token for the chain's native currency. Routing, approvals and
//! slippage are the venue's concern.

use async_trait::async_trait;
use sweeper_account::AccountSigner;
use sweeper_bridge::BridgeError;
use sweeper_delivery::DeliveryError;
use sweeper_types::{TokenBalance, TransactionReceipt};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod relay;
}

pub use implementations::relay::RelaySwap;

/// Errors that can occur during swap operations.
#[derive(Debug, Error)]
pub enum SwapError {
	/// Error that occurs when the venue cannot quote the swap.
	#[error("Quote error: {0}")]
	Quote(#[from] BridgeError),
	/// Error that occurs when a swap transaction fails.
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	/// Error that occurs when a quote has nothing to execute.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Trait defining the interface for swap venues.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SwapInterface: Send + Sync {
	/// Sells all of `balance` for native currency on its chain.
	///
	/// Returns the receipts of every transaction sent, in order.
	async fn swap_to_native(
		&self,
		signer: &AccountSigner,
		balance: &TokenBalance,
	) -> Result<Vec<TransactionReceipt>, SwapError>;
}
