//! Read-only balance report.

use crate::retry::retry;
use sweeper_account::Account;
use sweeper_delivery::DeliveryService;
use sweeper_types::{format_amount, ActionOutcome, Chain, RetryPolicy};
use tracing::instrument;

/// Logs the non-zero native and tracked token balances of an account.
pub struct BalanceReporter {
	delivery: DeliveryService,
	chains: Vec<Chain>,
	retry: RetryPolicy,
}

impl BalanceReporter {
	pub fn new(delivery: DeliveryService, chains: Vec<Chain>, retry: RetryPolicy) -> Self {
		Self {
			delivery,
			chains,
			retry,
		}
	}

	/// Returns the lines reported for `account`. Never moves value, so the
	/// outcome is `NoEffect` unless a balance could not be read.
	#[instrument(skip_all, fields(account = %account.address()))]
	pub async fn report(&self, account: &Account) -> (ActionOutcome, Vec<String>) {
		let owner = account.address();
		let mut lines = Vec::new();
		let mut failed = false;

		for chain in &self.chains {
			let native = retry(&self.retry, "native balance", || {
				self.delivery.get_balance(chain.chain_id, owner)
			})
			.await
			.ok()
			.flatten();
			match native {
				Some(balance) if !balance.is_zero() => lines.push(format!(
					"{}: {} {}",
					chain.name,
					format_amount(balance, chain.currency.decimals, 6),
					chain.currency.symbol
				)),
				Some(_) => {},
				None => failed = true,
			}

			let tokens = retry(&self.retry, "token balances", || {
				self.delivery
					.get_token_balances(chain.chain_id, owner, &chain.tokens)
			})
			.await
			.ok()
			.flatten();
			let Some(amounts) = tokens else {
				failed = true;
				continue;
			};
			for (token, amount) in chain.tokens.iter().zip(amounts) {
				if !amount.is_zero() {
					lines.push(format!(
						"{}: {} {}",
						chain.name,
						format_amount(amount, token.decimals, 6),
						token.symbol
					));
				}
			}
		}

		for line in &lines {
			tracing::info!("{}", line);
		}
		if lines.is_empty() && !failed {
			tracing::info!("No balances");
		}

		let outcome = if failed {
			ActionOutcome::Failed
		} else {
			ActionOutcome::NoEffect
		};
		(outcome, lines)
	}
}
