//! Batch driver.
//!
//! Accounts are processed strictly one after another. Each account runs the
//! scenario's fixed list of steps; value-moving steps wait for the gas gate
//! first. Pauses are only inserted after steps and accounts that actually did
//! something, so idle accounts do not slow the batch down.

pub mod scenario;
pub mod steps;

use crate::gas_gate::GasGate;
use crate::{output, timing};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use sweeper_account::Account;
use sweeper_types::{ActionOutcome, DelayRange};
use tracing::instrument;

/// One unit of per-account work.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AccountStep: Send + Sync {
	/// Label used in logs.
	fn name(&self) -> &'static str;

	/// Whether the step can spend funds and must wait for the gas gate.
	fn moves_value(&self) -> bool {
		true
	}

	async fn run(&self, account: &Account) -> ActionOutcome;
}

/// Totals for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
	pub accounts: usize,
	/// Accounts where at least one step had an effect.
	pub active: usize,
	/// Steps that gave up after exhausting retries.
	pub failed_steps: usize,
}

pub struct AccountOrchestrator {
	steps: Vec<Box<dyn AccountStep>>,
	gas_gate: Option<GasGate>,
	between_accounts: DelayRange,
	between_actions: DelayRange,
	shuffle: bool,
}

impl AccountOrchestrator {
	pub fn new(
		steps: Vec<Box<dyn AccountStep>>,
		gas_gate: Option<GasGate>,
		between_accounts: DelayRange,
		between_actions: DelayRange,
		shuffle: bool,
	) -> Self {
		Self {
			steps,
			gas_gate,
			between_accounts,
			between_actions,
			shuffle,
		}
	}

	/// Runs every step for every account.
	#[instrument(skip_all, fields(accounts = accounts.len()))]
	pub async fn run(&self, mut accounts: Vec<Account>) -> RunSummary {
		if self.shuffle {
			accounts.shuffle(&mut rand::rng());
		}

		let total = accounts.len();
		let mut summary = RunSummary {
			accounts: total,
			..Default::default()
		};

		for (index, account) in accounts.iter().enumerate() {
			println!("{}", output::account_banner(index + 1, total, account.address()));

			let (effect, failed) = self.process_account(account).await;
			summary.failed_steps += failed;
			if effect {
				summary.active += 1;
				if index + 1 < total {
					timing::pause(&self.between_accounts, "before the next account").await;
				}
			}
		}

		tracing::info!(
			accounts = summary.accounts,
			active = summary.active,
			failed_steps = summary.failed_steps,
			"Batch finished"
		);
		summary
	}

	/// Runs the steps for one account. Returns whether any step had an
	/// effect and how many failed.
	#[instrument(skip_all, fields(account = %account.address()))]
	pub async fn process_account(&self, account: &Account) -> (bool, usize) {
		let mut effect = false;
		let mut failed = 0;

		for (index, step) in self.steps.iter().enumerate() {
			if step.moves_value() {
				if let Some(gate) = &self.gas_gate {
					gate.wait_for_acceptable_price().await;
				}
			}

			let outcome = step.run(account).await;
			tracing::debug!(step = step.name(), ?outcome, "Step finished");
			if outcome.has_effect() {
				effect = true;
				if index + 1 < self.steps.len() {
					timing::pause(&self.between_actions, "between actions").await;
				}
			} else if outcome == ActionOutcome::Failed {
				failed += 1;
			}
		}

		(effect, failed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_signer_local::PrivateKeySigner;
	use std::collections::HashMap;
	use std::sync::Arc;
	use std::time::Duration;
	use sweeper_account::AccountSigner;
	use sweeper_delivery::{DeliveryInterface, DeliveryService, MockDeliveryInterface};
	use sweeper_types::utils::builders::ChainBuilder;

	fn accounts(count: usize) -> Vec<Account> {
		(0..count)
			.map(|_| Account::new(AccountSigner::Local(PrivateKeySigner::random()), None))
			.collect()
	}

	/// Step whose outcome depends on the account's position in `effects`.
	fn step_for(accounts: &[Account], effects: Vec<ActionOutcome>) -> MockAccountStep {
		let outcomes: HashMap<_, _> = accounts
			.iter()
			.map(|a| a.address())
			.zip(effects)
			.collect();
		let mut step = MockAccountStep::new();
		step.expect_name().return_const("mock");
		step.expect_moves_value().return_const(true);
		step.expect_run().returning(move |account| {
			let outcome = outcomes[&account.address()];
			Box::pin(async move { outcome })
		});
		step
	}

	fn orchestrator(steps: Vec<Box<dyn AccountStep>>, gate: Option<GasGate>) -> AccountOrchestrator {
		AccountOrchestrator::new(
			steps,
			gate,
			DelayRange::new(100, 100),
			DelayRange::new(10, 10),
			false,
		)
	}

	#[tokio::test(start_paused = true)]
	async fn test_account_delay_only_after_effect() {
		let accounts = accounts(3);
		let step = step_for(
			&accounts,
			vec![
				ActionOutcome::NoEffect,
				ActionOutcome::Effect,
				ActionOutcome::Effect,
			],
		);
		let orchestrator = orchestrator(vec![Box::new(step)], None);

		let start = tokio::time::Instant::now();
		let summary = orchestrator.run(accounts).await;

		// Only the second account is followed by another one.
		assert_eq!(start.elapsed(), Duration::from_secs(100));
		assert_eq!(summary.active, 2);
		assert_eq!(summary.accounts, 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_idle_and_failed_accounts_do_not_pause() {
		let accounts = accounts(3);
		let step = step_for(
			&accounts,
			vec![
				ActionOutcome::NoEffect,
				ActionOutcome::Failed,
				ActionOutcome::NoEffect,
			],
		);
		let orchestrator = orchestrator(vec![Box::new(step)], None);

		let start = tokio::time::Instant::now();
		let summary = orchestrator.run(accounts).await;

		assert_eq!(start.elapsed(), Duration::ZERO);
		assert_eq!(summary.active, 0);
		assert_eq!(summary.failed_steps, 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_action_delay_between_steps_after_effect() {
		let accounts = accounts(1);
		let sweep = step_for(&accounts, vec![ActionOutcome::Effect]);
		let forward = step_for(&accounts, vec![ActionOutcome::NoEffect]);
		let orchestrator = orchestrator(vec![Box::new(sweep), Box::new(forward)], None);

		let start = tokio::time::Instant::now();
		let (effect, failed) = orchestrator.process_account(&accounts[0]).await;

		assert!(effect);
		assert_eq!(failed, 0);
		assert_eq!(start.elapsed(), Duration::from_secs(10));
	}

	#[tokio::test(start_paused = true)]
	async fn test_gas_gate_only_before_value_moving_steps() {
		let mut prices = vec![Ok(1_000_000_000u128), Ok(50_000_000_000u128)];
		let mut mock = MockDeliveryInterface::new();
		mock.expect_get_gas_price().times(2).returning(move || {
			let next = prices.pop().unwrap_or(Ok(0));
			Box::pin(async move { next })
		});
		let mut implementations: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		implementations.insert(1, Arc::new(mock));
		let gate = GasGate::new(
			DeliveryService::new(implementations),
			&ChainBuilder::new("Ethereum", 1).build(),
			20.0,
			Duration::from_secs(60),
		);

		let accounts = accounts(1);
		let mut reporter = MockAccountStep::new();
		reporter.expect_name().return_const("report");
		reporter.expect_moves_value().return_const(false);
		reporter
			.expect_run()
			.times(1)
			.returning(|_| Box::pin(async { ActionOutcome::NoEffect }));
		let bridge = step_for(&accounts, vec![ActionOutcome::NoEffect]);

		let orchestrator = orchestrator(vec![Box::new(reporter), Box::new(bridge)], Some(gate));

		let start = tokio::time::Instant::now();
		orchestrator.process_account(&accounts[0]).await;
		assert_eq!(start.elapsed(), Duration::from_secs(60));
	}
}
