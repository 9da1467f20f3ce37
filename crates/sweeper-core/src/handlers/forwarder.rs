//! Native forwarding to the account's destination address.
//!
//! The whole native balance is sent except a reserve for the transfer's own
//! gas, scaled by a safety multiplier, plus an optional configured extra.

use super::StepError;
use crate::amount::resolve_amount;
use crate::output;
use crate::retry::retry;
use alloy_primitives::{Address, U256};
use sweeper_account::Account;
use sweeper_delivery::DeliveryService;
use sweeper_types::{format_amount, ActionOutcome, AmountSpec, Chain, RetryPolicy, Transaction};
use tracing::instrument;

/// Value carried by the transfer used for gas estimation.
const PROBE_VALUE: u64 = 1_000_000_000;

pub struct NativeForwarder {
	delivery: DeliveryService,
	chain: Chain,
	min_to_send: U256,
	/// Gas safety multiplier in thousandths.
	gas_multiplier: u64,
	extra_leave: (U256, U256),
	retry: RetryPolicy,
}

impl NativeForwarder {
	pub fn new(
		delivery: DeliveryService,
		chain: Chain,
		min_to_send: U256,
		gas_multiplier: f64,
		extra_leave: (U256, U256),
		retry: RetryPolicy,
	) -> Self {
		Self {
			delivery,
			chain,
			min_to_send,
			gas_multiplier: (gas_multiplier.max(0.0) * 1000.0).round() as u64,
			extra_leave,
			retry,
		}
	}

	/// Sends the spendable native balance to the account's destination.
	#[instrument(skip_all, fields(account = %account.address(), chain = %self.chain.name))]
	pub async fn forward(&self, account: &Account) -> ActionOutcome {
		let destination = match account.require_destination() {
			Ok(destination) => destination,
			Err(e) => {
				tracing::error!("{}", e);
				return ActionOutcome::Failed;
			},
		};

		let prepared = retry(&self.retry, "prepare native transfer", || {
			self.prepare(account.address(), destination)
		})
		.await
		.ok()
		.flatten();

		let tx = match prepared {
			None => return ActionOutcome::Failed,
			Some(None) => return ActionOutcome::NoEffect,
			Some(Some(tx)) => tx,
		};

		let value = tx.value;
		let receipt = retry(&self.retry, "send native", || {
			self.delivery.submit(account.signer(), tx.clone())
		})
		.await
		.ok()
		.flatten();

		match receipt {
			Some(receipt) => {
				let action = format!(
					"Sent {} {} to {}",
					format_amount(value, self.chain.currency.decimals, 6),
					self.chain.currency.symbol,
					destination
				);
				tracing::info!("{}", output::success_line(&action, &self.chain, &receipt.hash));
				ActionOutcome::Effect
			},
			None => ActionOutcome::Failed,
		}
	}

	/// Builds the transfer, or `None` when the spendable amount is dust.
	async fn prepare(
		&self,
		from: Address,
		destination: Address,
	) -> Result<Option<Transaction>, StepError> {
		let chain_id = self.chain.chain_id;
		let balance = self.delivery.get_balance(chain_id, from).await?;
		let gas_price = self.delivery.get_gas_price(chain_id).await?;
		let probe = Transaction::transfer(chain_id, destination, U256::from(PROBE_VALUE));
		let gas_limit = self.delivery.estimate_gas(from, probe).await?;

		let reserve = U256::from(gas_price) * U256::from(gas_limit) * U256::from(self.gas_multiplier)
			/ U256::from(1000u64);
		let spec = AmountSpec::LeaveBehind {
			min: reserve.saturating_add(self.extra_leave.0),
			max: reserve.saturating_add(self.extra_leave.1),
		};
		let amount = resolve_amount(&spec, balance, &mut rand::rng());

		if amount <= self.min_to_send {
			tracing::info!(
				balance = %format_amount(balance, self.chain.currency.decimals, 6),
				"Nothing to send above {} {}",
				format_amount(self.min_to_send, self.chain.currency.decimals, 6),
				self.chain.currency.symbol
			);
			return Ok(None);
		}

		Ok(Some(Transaction {
			gas_limit: Some(gas_limit),
			gas_price: Some(gas_price),
			..Transaction::transfer(chain_id, destination, amount)
		}))
	}
}
