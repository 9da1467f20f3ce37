//! Per-account steps.
//!
//! Each handler performs one kind of work for one account and reports an
//! [`ActionOutcome`](sweeper_types::ActionOutcome). Network faults are retried
//! inside the handler and never escape it; the orchestrator only sees whether
//! anything happened.

pub mod bridge;
pub mod forwarder;
pub mod reporter;
pub mod sweeper;

pub use bridge::{BridgeRoute, BridgeRouter};
pub use forwarder::NativeForwarder;
pub use reporter::BalanceReporter;
pub use sweeper::BalanceSweeper;

use sweeper_bridge::BridgeError;
use sweeper_delivery::DeliveryError;
use sweeper_swap::SwapError;
use thiserror::Error;

/// Errors raised inside a retried step.
#[derive(Debug, Error)]
pub enum StepError {
	#[error("Bridge error: {0}")]
	Bridge(#[from] BridgeError),
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	#[error("Swap error: {0}")]
	Swap(#[from] SwapError),
}
