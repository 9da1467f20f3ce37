//! Gas price gating for value-moving steps.

use alloy_primitives::U256;
use std::time::Duration;
use sweeper_delivery::DeliveryService;
use sweeper_types::utils::gwei_to_wei;
use sweeper_types::{format_amount, Chain};

/// Blocks until the watched chain's gas price is at or below a ceiling.
#[derive(Clone)]
pub struct GasGate {
	delivery: DeliveryService,
	chain_id: u64,
	chain_name: String,
	ceiling: u128,
	poll_interval: Duration,
}

impl GasGate {
	pub fn new(
		delivery: DeliveryService,
		chain: &Chain,
		max_gwei: f64,
		poll_interval: Duration,
	) -> Self {
		Self {
			delivery,
			chain_id: chain.chain_id,
			chain_name: chain.name.clone(),
			ceiling: gwei_to_wei(max_gwei),
			poll_interval,
		}
	}

	/// Polls the gas price until it is acceptable.
	///
	/// RPC failures are logged and count as "not yet acceptable".
	pub async fn wait_for_acceptable_price(&self) {
		loop {
			match self.delivery.get_gas_price(self.chain_id).await {
				Ok(price) if price <= self.ceiling => {
					tracing::debug!(chain = %self.chain_name, gas_price = price, "Gas price acceptable");
					return;
				},
				Ok(price) => {
					tracing::info!(
						chain = %self.chain_name,
						"Gas price {} gwei is above {} gwei, waiting {:?}",
						format_amount(U256::from(price), 9, 2),
						format_amount(U256::from(self.ceiling), 9, 2),
						self.poll_interval
					);
				},
				Err(e) => {
					tracing::warn!(chain = %self.chain_name, "Failed to read gas price: {}", e);
				},
			}
			tokio::time::sleep(self.poll_interval).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::sync::Arc;
	use sweeper_delivery::{DeliveryError, DeliveryInterface, MockDeliveryInterface};
	use sweeper_types::utils::builders::ChainBuilder;

	const GWEI: u128 = 1_000_000_000;

	#[tokio::test(start_paused = true)]
	async fn test_waits_until_price_drops() {
		let mut prices = vec![
			Ok(10 * GWEI),
			Err(DeliveryError::Network("timeout".into())),
			Ok(35 * GWEI),
			Ok(30 * GWEI),
		];
		let mut mock = MockDeliveryInterface::new();
		mock.expect_get_gas_price().times(4).returning(move || {
			let next = prices.pop().unwrap_or(Ok(0));
			Box::pin(async move { next })
		});

		let mut implementations: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		implementations.insert(1, Arc::new(mock));
		let chain = ChainBuilder::new("Ethereum", 1).build();
		let gate = GasGate::new(
			DeliveryService::new(implementations),
			&chain,
			20.0,
			Duration::from_secs(60),
		);

		let start = tokio::time::Instant::now();
		gate.wait_for_acceptable_price().await;
		assert_eq!(start.elapsed(), Duration::from_secs(180));
	}

	#[tokio::test(start_paused = true)]
	async fn test_price_at_ceiling_passes_immediately() {
		let mut mock = MockDeliveryInterface::new();
		mock.expect_get_gas_price()
			.times(1)
			.returning(|| Box::pin(async { Ok(20 * GWEI) }));

		let mut implementations: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		implementations.insert(1, Arc::new(mock));
		let chain = ChainBuilder::new("Ethereum", 1).build();
		let gate = GasGate::new(
			DeliveryService::new(implementations),
			&chain,
			20.0,
			Duration::from_secs(60),
		);

		let start = tokio::time::Instant::now();
		gate.wait_for_acceptable_price().await;
		assert_eq!(start.elapsed(), Duration::ZERO);
	}
}
