//! Common types for the sweeper workspace.
//!
//! Shared data model used by every other crate: transactions, the static chain
//! registry, declarative amount and delay ranges, retry policy, and the
//! per-step outcome the orchestrator uses for delay gating.

/// Transaction types exchanged with the delivery layer.
pub mod account;
/// Declarative amount specifications resolved against live balances.
pub mod amount;
/// Ephemeral balance and quote records.
pub mod balances;
/// Static chain metadata.
pub mod chains;
/// Transaction hashes and receipts.
pub mod delivery;
/// Retry, delay and outcome policy values.
pub mod policy;
/// Formatting and parsing helpers.
pub mod utils;

pub use account::Transaction;
pub use amount::{AmountSpec, AmountSpecError, ValueRange};
pub use balances::{BridgeQuote, TokenBalance};
pub use chains::{
	Chain, ChainOverride, ChainRegistry, NativeCurrency, StargateDeployment, TokenConfig,
};
pub use delivery::{TransactionHash, TransactionReceipt};
pub use policy::{ActionOutcome, DelayRange, RetryPolicy};
pub use utils::{format_amount, parse_amount};
