//! [`AccountStep`] adapters for the handlers.

use super::AccountStep;
use crate::handlers::{
	BalanceReporter, BalanceSweeper, BridgeRoute, BridgeRouter, NativeForwarder,
};
use async_trait::async_trait;
use sweeper_account::Account;
use sweeper_types::ActionOutcome;

#[async_trait]
impl AccountStep for BalanceSweeper {
	fn name(&self) -> &'static str {
		"garbage collector"
	}

	async fn run(&self, account: &Account) -> ActionOutcome {
		self.sweep(account).await
	}
}

#[async_trait]
impl AccountStep for NativeForwarder {
	fn name(&self) -> &'static str {
		"native sender"
	}

	async fn run(&self, account: &Account) -> ActionOutcome {
		self.forward(account).await
	}
}

#[async_trait]
impl AccountStep for BalanceReporter {
	fn name(&self) -> &'static str {
		"balance checker"
	}

	fn moves_value(&self) -> bool {
		false
	}

	async fn run(&self, account: &Account) -> ActionOutcome {
		self.report(account).await.0
	}
}

/// A router bound to one configured route.
pub struct BridgeStep {
	name: &'static str,
	router: BridgeRouter,
	route: BridgeRoute,
}

impl BridgeStep {
	pub fn new(name: &'static str, router: BridgeRouter, route: BridgeRoute) -> Self {
		Self {
			name,
			router,
			route,
		}
	}
}

#[async_trait]
impl AccountStep for BridgeStep {
	fn name(&self) -> &'static str {
		self.name
	}

	async fn run(&self, account: &Account) -> ActionOutcome {
		self.router.run(account, &self.route).await
	}
}
