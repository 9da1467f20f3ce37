//! Orchestration core of the sweeper.
//!
//! Retry, amount resolution, gas gating and pauses are small standalone
//! pieces. The handlers combine them into per-account steps (sweep, forward,
//! bridge, report) and the engine runs those steps over a batch of accounts.

/// Amount resolution against live balances.
pub mod amount;
/// Batch driver, step trait and scenarios.
pub mod engine;
/// Gas price ceiling.
pub mod gas_gate;
/// Per-account steps.
pub mod handlers;
/// Operator-facing terminal lines.
pub mod output;
/// Bounded fixed-interval retries.
pub mod retry;
/// Humanized pauses.
pub mod timing;

pub use amount::resolve_amount;
pub use engine::scenario::{Scenario, UnknownScenario};
pub use engine::steps::BridgeStep;
pub use engine::{AccountOrchestrator, AccountStep, RunSummary};
pub use gas_gate::GasGate;
pub use handlers::{
	BalanceReporter, BalanceSweeper, BridgeRoute, BridgeRouter, NativeForwarder, StepError,
};
pub use retry::retry;
