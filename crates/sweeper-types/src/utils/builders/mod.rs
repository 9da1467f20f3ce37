//! Builder utilities for creating test and production instances of sweeper types.

pub mod chain;
pub mod transaction;

pub use chain::ChainBuilder;
pub use transaction::TransactionBuilder;
