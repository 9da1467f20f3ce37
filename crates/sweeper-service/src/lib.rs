//! Sweeper service library.
//!
//! Wires configuration, chain clients and backends into an
//! [`AccountOrchestrator`](sweeper_core::AccountOrchestrator) for a scenario,
//! and renders the scenario menu.

pub mod factory;
pub mod menu;

pub use factory::build_orchestrator;
