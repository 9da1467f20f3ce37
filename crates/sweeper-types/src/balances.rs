//! Ephemeral records produced by balance queries and bridge quotes.
//!
//! Neither type is cached: balances are consumed by the swap attempt that
//! follows them and quotes are refetched for every bridge attempt.

use crate::account::Transaction;
use crate::chains::TokenConfig;
use alloy_primitives::U256;

/// A non-zero holding discovered by a batched balance lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
	pub chain_id: u64,
	pub token: TokenConfig,
	pub amount: U256,
}

/// Fee quote from a bridge backend together with the payload to submit.
///
/// A quote is used at most once. Adjustments for fees and gas are applied to
/// copies of `transaction`, never to the quote itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeQuote {
	/// Bridge fee charged in the source chain's native currency.
	pub fee: U256,
	/// Amount the quote was requested for.
	pub amount: U256,
	/// Transaction the backend asks the user to submit.
	pub transaction: Transaction,
	/// Gas units suggested by the backend, if it provided any.
	pub estimated_gas: Option<u64>,
}
