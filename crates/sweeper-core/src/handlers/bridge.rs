//! Native bridging across a set of candidate source chains.
//!
//! Candidates are tried one at a time, optionally shuffled. For each one the
//! amount is resolved against the live balance, quoted twice (first with a
//! guessed fee, then with the real one), reduced by the gas reserve and
//! submitted. When the fee is paid on top, the quoted value plus the gas
//! reserve must fit in the balance. The first successful bridge ends the run
//! for the account.

use super::StepError;
use crate::amount::resolve_amount;
use crate::retry::retry;
use crate::{output, timing};
use alloy_primitives::U256;
use rand::seq::SliceRandom;
use std::sync::Arc;
use sweeper_account::Account;
use sweeper_bridge::{BridgeInterface, BridgeRequest};
use sweeper_config::{BridgeConfig, ConfigError};
use sweeper_delivery::DeliveryService;
use sweeper_types::{
	format_amount, ActionOutcome, AmountSpec, Chain, ChainRegistry, DelayRange, RetryPolicy,
	TransactionReceipt,
};
use tracing::instrument;

/// Safety factor applied to the estimated gas cost, as a fraction.
const GAS_SAFETY_NUMERATOR: u64 = 16;
const GAS_SAFETY_DENOMINATOR: u64 = 10;

/// Where and how much to bridge, resolved from configuration.
#[derive(Debug, Clone)]
pub struct BridgeRoute {
	pub from_networks: Vec<Chain>,
	pub to_network: Chain,
	pub amount: AmountSpec,
	pub min_to_bridge: U256,
	pub deduct_fee: bool,
	pub shuffle: bool,
}

impl BridgeRoute {
	pub fn from_config(
		config: &BridgeConfig,
		section: &str,
		registry: &ChainRegistry,
	) -> Result<Self, ConfigError> {
		let lookup = |name: &str| {
			registry.get(name).cloned().ok_or_else(|| {
				ConfigError::Validation(format!("{section}: unknown chain '{name}'"))
			})
		};

		Ok(Self {
			from_networks: config
				.from_networks
				.iter()
				.map(|name| lookup(name.as_str()))
				.collect::<Result<_, _>>()?,
			to_network: lookup(config.to_network.as_str())?,
			amount: config.amount_spec(section)?,
			min_to_bridge: config.min_to_bridge_wei(section)?,
			deduct_fee: config.deduct_fee,
			shuffle: config.shuffle_networks,
		})
	}
}

enum Candidate {
	Bridged,
	Skipped,
	Failed,
}

pub struct BridgeRouter {
	bridge: Arc<dyn BridgeInterface>,
	delivery: DeliveryService,
	retry: RetryPolicy,
	between_actions: DelayRange,
}

impl BridgeRouter {
	pub fn new(
		bridge: Arc<dyn BridgeInterface>,
		delivery: DeliveryService,
		retry: RetryPolicy,
		between_actions: DelayRange,
	) -> Self {
		Self {
			bridge,
			delivery,
			retry,
			between_actions,
		}
	}

	/// Bridges from the first candidate chain that yields a bridgeable amount.
	///
	/// A chain pair whose native currency the backend cannot move fails the
	/// whole run without requesting a quote.
	#[instrument(skip_all, fields(account = %account.address(), bridge = self.bridge.name()))]
	pub async fn run(&self, account: &Account, route: &BridgeRoute) -> ActionOutcome {
		let mut candidates: Vec<&Chain> = route.from_networks.iter().collect();
		if route.shuffle {
			candidates.shuffle(&mut rand::rng());
		}

		let currency = self.bridge.currency();
		let destination = &route.to_network;
		let mut failed = false;

		for source in candidates {
			if !source.currency.matches(currency) || !destination.currency.matches(currency) {
				tracing::error!(
					"Only {} can be bridged between {}-native chains, {} or {} is not",
					currency,
					currency,
					source.name,
					destination.name
				);
				return ActionOutcome::Failed;
			}
			if source.chain_id == destination.chain_id {
				tracing::debug!(chain = %source.name, "Source is the destination, skipping");
				continue;
			}

			match self.try_source(account, source, route).await {
				Candidate::Bridged => {
					timing::pause(&self.between_actions, "after bridging").await;
					return ActionOutcome::Effect;
				},
				Candidate::Skipped => {},
				Candidate::Failed => failed = true,
			}
		}

		if failed {
			ActionOutcome::Failed
		} else {
			ActionOutcome::NoEffect
		}
	}

	async fn try_source(&self, account: &Account, source: &Chain, route: &BridgeRoute) -> Candidate {
		let user = account.address();
		let destination = &route.to_network;
		let decimals = source.currency.decimals;

		let balance = retry(&self.retry, "native balance", || {
			self.delivery.get_balance(source.chain_id, user)
		})
		.await
		.ok()
		.flatten();
		let Some(balance) = balance else {
			return Candidate::Failed;
		};

		let amount = resolve_amount(&route.amount, balance, &mut rand::rng());
		if amount.is_zero() {
			tracing::info!(chain = %source.name, "Nothing to bridge");
			return Candidate::Skipped;
		}
		if amount < route.min_to_bridge {
			tracing::info!(
				chain = %source.name,
				"{} {} is below the limit of {}",
				format_amount(amount, decimals, 6),
				source.currency.symbol,
				format_amount(route.min_to_bridge, decimals, 6)
			);
			return Candidate::Skipped;
		}

		let result = retry(&self.retry, "bridge", || {
			self.attempt(account, source, destination, balance, amount, route.deduct_fee)
		})
		.await
		.ok()
		.flatten();

		match result {
			Some(Some((value, receipt))) => {
				let action = format!(
					"Bridged {} {} to {} via {}",
					format_amount(value, decimals, 6),
					source.currency.symbol,
					destination.name,
					self.bridge.name()
				);
				tracing::info!("{}", output::success_line(&action, source, &receipt.hash));
				Candidate::Bridged
			},
			Some(None) => Candidate::Skipped,
			None => {
				tracing::warn!("Bridge from {} to {} failed", source.name, destination.name);
				Candidate::Failed
			},
		}
	}

	/// One quote, adjust and submit round. `Ok(None)` means the amount does
	/// not survive fee and gas deduction and the candidate is skipped.
	async fn attempt(
		&self,
		account: &Account,
		source: &Chain,
		destination: &Chain,
		balance: U256,
		amount: U256,
		deduct_fee: bool,
	) -> Result<Option<(U256, TransactionReceipt)>, StepError> {
		let user = account.address();
		let skip = |value: U256, reason: &str| {
			tracing::info!(
				"Can't bridge {} {} from {} to {}: {}",
				format_amount(value, source.currency.decimals, 6),
				source.currency.symbol,
				source.name,
				destination.name,
				reason
			);
		};

		let guesses = self.bridge.fee_guesses();
		let first_amount = if guesses.is_empty() {
			amount
		} else {
			match guesses
				.iter()
				.find_map(|fee| amount.checked_sub(*fee).filter(|v| !v.is_zero()))
			{
				Some(first_amount) => first_amount,
				None => {
					skip(amount, "small amount");
					return Ok(None);
				},
			}
		};

		let mut request = BridgeRequest {
			user,
			recipient: user,
			from_chain_id: source.chain_id,
			to_chain_id: destination.chain_id,
			amount: first_amount,
		};
		let estimate = self.bridge.quote(&request).await?;

		request.amount = if deduct_fee {
			match amount.checked_sub(estimate.fee).filter(|v| !v.is_zero()) {
				Some(value) => value,
				None => {
					skip(amount, "small amount");
					return Ok(None);
				},
			}
		} else {
			amount.min(balance.saturating_sub(estimate.fee))
		};
		if request.amount.is_zero() {
			skip(amount, "small amount");
			return Ok(None);
		}
		let mut quote = self.bridge.quote(&request).await?;

		let probe = match self.bridge.gas_probe(&quote) {
			Ok(probe) => probe,
			Err(e) => {
				skip(request.amount, &e.to_string());
				return Ok(None);
			},
		};
		let gas_limit = match self.delivery.estimate_gas(user, probe).await {
			Ok(gas_limit) => gas_limit,
			Err(e) => match quote.estimated_gas {
				Some(suggested) => {
					tracing::debug!("Gas estimation failed, using quoted gas {}: {}", suggested, e);
					suggested
				},
				None => return Err(e.into()),
			},
		};
		let gas_price = match quote.transaction.quoted_gas_price() {
			Some(price) => price,
			None => self.delivery.get_gas_price(source.chain_id).await?,
		};
		let gas_cost = U256::from(gas_price) * U256::from(gas_limit)
			* U256::from(GAS_SAFETY_NUMERATOR)
			/ U256::from(GAS_SAFETY_DENOMINATOR);

		let value = if deduct_fee {
			match quote.transaction.value.checked_sub(gas_cost) {
				Some(value) => value,
				None => {
					skip(U256::ZERO, "value is too small after fee deduction");
					return Ok(None);
				},
			}
		} else {
			let total = quote.transaction.value.saturating_add(gas_cost);
			if total > balance {
				// Shrink by the overdraft once and re-quote.
				let overdraft = total - balance;
				request.amount = match request.amount.checked_sub(overdraft) {
					Some(value) if !value.is_zero() => value,
					_ => {
						skip(request.amount, "balance does not cover fee and gas");
						return Ok(None);
					},
				};
				quote = self.bridge.quote(&request).await?;
				if quote.transaction.value.saturating_add(gas_cost) > balance {
					skip(request.amount, "balance does not cover fee and gas");
					return Ok(None);
				}
			}
			quote.transaction.value
		};
		if value.is_zero() {
			skip(value, "value is too small after fee deduction");
			return Ok(None);
		}

		let mut tx = match self.bridge.adjust(&quote, value) {
			Ok(tx) => tx,
			Err(e) => {
				skip(value, &e.to_string());
				return Ok(None);
			},
		};
		tx.gas_limit = Some(gas_limit);
		if tx.value.is_zero() {
			skip(tx.value, "value is too small after fee deduction");
			return Ok(None);
		}

		tracing::info!(
			fee = %format_amount(quote.fee, source.currency.decimals, 6),
			gas_limit,
			"Bridging {} {} from {} to {}",
			format_amount(tx.value, source.currency.decimals, 6),
			source.currency.symbol,
			source.name,
			destination.name
		);
		let value = tx.value;
		let receipt = self.delivery.submit(account.signer(), tx).await?;
		Ok(Some((value, receipt)))
	}
}
