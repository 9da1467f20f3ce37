//! Token sweeping.
//!
//! For every configured chain the tracked token balances are read in one
//! batched call, then each balance above the threshold is sold for native
//! currency. Swaps are independent: one failing token does not stop the rest.

use crate::output;
use crate::retry::retry;
use alloy_primitives::U256;
use std::sync::Arc;
use sweeper_account::Account;
use sweeper_delivery::DeliveryService;
use sweeper_swap::SwapInterface;
use sweeper_types::{format_amount, ActionOutcome, Chain, RetryPolicy, TokenBalance};
use tracing::instrument;

pub struct BalanceSweeper {
	delivery: DeliveryService,
	swap: Arc<dyn SwapInterface>,
	chains: Vec<Chain>,
	min_token_balance: U256,
	retry: RetryPolicy,
}

impl BalanceSweeper {
	pub fn new(
		delivery: DeliveryService,
		swap: Arc<dyn SwapInterface>,
		chains: Vec<Chain>,
		min_token_balance: U256,
		retry: RetryPolicy,
	) -> Self {
		Self {
			delivery,
			swap,
			chains,
			min_token_balance,
			retry,
		}
	}

	/// Swaps every non-zero tracked token of `account` to native currency.
	#[instrument(skip_all, fields(account = %account.address()))]
	pub async fn sweep(&self, account: &Account) -> ActionOutcome {
		let mut swapped = 0usize;
		let mut failed = 0usize;

		for chain in &self.chains {
			let Some(balances) = self.non_zero_balances(account, chain).await else {
				failed += 1;
				continue;
			};

			for balance in balances {
				let receipts = retry(&self.retry, "swap", || {
					self.swap.swap_to_native(account.signer(), &balance)
				})
				.await
				.ok()
				.flatten();

				match receipts {
					Some(receipts) => {
						swapped += 1;
						if let Some(last) = receipts.last() {
							let action = format!(
								"Swapped {} {}",
								format_amount(balance.amount, balance.token.decimals, 6),
								balance.token.symbol
							);
							tracing::info!("{}", output::success_line(&action, chain, &last.hash));
						}
					},
					None => {
						failed += 1;
						tracing::warn!(
							chain = %chain.name,
							token = %balance.token.symbol,
							"Swap failed, continuing with the next token"
						);
					},
				}
			}
		}

		if swapped > 0 {
			ActionOutcome::Effect
		} else if failed > 0 {
			ActionOutcome::Failed
		} else {
			ActionOutcome::NoEffect
		}
	}

	/// Tracked balances on `chain` above the threshold, or `None` when they
	/// could not be read.
	pub(crate) async fn non_zero_balances(
		&self,
		account: &Account,
		chain: &Chain,
	) -> Option<Vec<TokenBalance>> {
		let owner = account.address();
		let amounts = retry(&self.retry, "token balances", || {
			self.delivery
				.get_token_balances(chain.chain_id, owner, &chain.tokens)
		})
		.await
		.ok()
		.flatten()?;

		let balances = chain
			.tokens
			.iter()
			.zip(amounts)
			.filter(|(_, amount)| !amount.is_zero() && *amount > self.min_token_balance)
			.map(|(token, amount)| TokenBalance {
				chain_id: chain.chain_id,
				token: token.clone(),
				amount,
			})
			.collect();
		Some(balances)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, B256};
	use alloy_signer_local::PrivateKeySigner;
	use std::collections::HashMap;
	use std::time::Duration;
	use sweeper_account::AccountSigner;
	use sweeper_delivery::{DeliveryError, DeliveryInterface, MockDeliveryInterface};
	use sweeper_swap::{MockSwapInterface, SwapError};
	use sweeper_types::utils::builders::ChainBuilder;
	use sweeper_types::{TransactionHash, TransactionReceipt};

	fn chain() -> Chain {
		ChainBuilder::new("Optimism", 10)
			.token(Address::repeat_byte(1), "USDC", 6)
			.token(Address::repeat_byte(2), "USDT", 6)
			.token(Address::repeat_byte(3), "DAI", 18)
			.build()
	}

	fn account() -> Account {
		Account::new(AccountSigner::Local(PrivateKeySigner::random()), None)
	}

	fn receipt() -> TransactionReceipt {
		TransactionReceipt {
			hash: TransactionHash(B256::repeat_byte(7)),
			block_number: 1,
			success: true,
			gas_used: 21_000,
		}
	}

	fn delivery(balances: Vec<u64>) -> DeliveryService {
		let mut mock = MockDeliveryInterface::new();
		mock.expect_get_token_balances().returning(move |_, _| {
			let balances = balances.iter().map(|b| U256::from(*b)).collect();
			Box::pin(async move { Ok(balances) })
		});
		let mut implementations: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		implementations.insert(10, Arc::new(mock));
		DeliveryService::new(implementations)
	}

	fn policy() -> RetryPolicy {
		RetryPolicy::new(2, Duration::from_secs(10))
	}

	#[tokio::test(start_paused = true)]
	async fn test_failed_swap_does_not_stop_others() {
		let mut swap = MockSwapInterface::new();
		swap.expect_swap_to_native()
			.withf(|_, balance| balance.token.symbol == "USDC")
			.times(2)
			.returning(|_, _| {
				Box::pin(async { Err(SwapError::InvalidResponse("no route".into())) })
			});
		swap.expect_swap_to_native()
			.withf(|_, balance| balance.token.symbol == "DAI")
			.times(1)
			.returning(|_, _| Box::pin(async { Ok(vec![receipt()]) }));

		let sweeper = BalanceSweeper::new(
			delivery(vec![5_000_000, 0, 7_000_000]),
			Arc::new(swap),
			vec![chain()],
			U256::ZERO,
			policy(),
		);

		assert_eq!(sweeper.sweep(&account()).await, ActionOutcome::Effect);
	}

	#[tokio::test]
	async fn test_nothing_to_swap_is_no_effect() {
		let mut swap = MockSwapInterface::new();
		swap.expect_swap_to_native().times(0);

		let sweeper = BalanceSweeper::new(
			delivery(vec![0, 100, 0]),
			Arc::new(swap),
			vec![chain()],
			U256::from(100u64),
			policy(),
		);

		assert_eq!(sweeper.sweep(&account()).await, ActionOutcome::NoEffect);
	}

	#[tokio::test(start_paused = true)]
	async fn test_all_swaps_failing_is_failed() {
		let mut swap = MockSwapInterface::new();
		swap.expect_swap_to_native().times(2).returning(|_, _| {
			Box::pin(async { Err(SwapError::InvalidResponse("no route".into())) })
		});

		let sweeper = BalanceSweeper::new(
			delivery(vec![1, 0, 0]),
			Arc::new(swap),
			vec![chain()],
			U256::ZERO,
			policy(),
		);

		assert_eq!(sweeper.sweep(&account()).await, ActionOutcome::Failed);
	}

	#[tokio::test(start_paused = true)]
	async fn test_unreadable_balances_skip_chain() {
		let mut mock = MockDeliveryInterface::new();
		mock.expect_get_token_balances()
			.times(2)
			.returning(|_, _| Box::pin(async { Err(DeliveryError::Network("down".into())) }));
		let mut implementations: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		implementations.insert(10, Arc::new(mock));

		let mut swap = MockSwapInterface::new();
		swap.expect_swap_to_native().times(0);

		let sweeper = BalanceSweeper::new(
			DeliveryService::new(implementations),
			Arc::new(swap),
			vec![chain()],
			U256::ZERO,
			policy(),
		);

		assert_eq!(sweeper.sweep(&account()).await, ActionOutcome::Failed);
	}
}
