//! Relay bridge backend.
//!
//! Quotes are `EXACT_OUTPUT` native-to-native routes. The deposit transaction
//! of the first step is submitted as is, with only its value changed when the
//! router deducts gas.

use crate::relay_api::{RelayApiClient, RelayQuoteRequest};
use crate::{BridgeError, BridgeInterface, BridgeRequest};
use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use sweeper_types::{BridgeQuote, Transaction};

/// Average relayer fee assumed for the first quote.
pub const AVERAGE_RELAY_FEE: u64 = 501_383_102_086_736;
/// Smaller guess used when the balance cannot cover the average fee.
pub const MINIMUM_RELAY_FEE: u64 = 50_000_000_000_000;

pub struct RelayBridge {
	api: Arc<RelayApiClient>,
}

impl RelayBridge {
	pub fn new(api: Arc<RelayApiClient>) -> Self {
		Self { api }
	}
}

#[async_trait]
impl BridgeInterface for RelayBridge {
	fn name(&self) -> &'static str {
		"relay"
	}

	fn currency(&self) -> &'static str {
		"ETH"
	}

	fn fee_guesses(&self) -> Vec<U256> {
		vec![U256::from(AVERAGE_RELAY_FEE), U256::from(MINIMUM_RELAY_FEE)]
	}

	async fn quote(&self, request: &BridgeRequest) -> Result<BridgeQuote, BridgeError> {
		let body = RelayQuoteRequest::bridge(
			request.user,
			request.recipient,
			request.from_chain_id,
			request.to_chain_id,
			request.amount,
		);
		let response = self.api.quote(&body).await?;

		let fee = response.relayer_fee()?;
		let data = response.first_transaction()?;
		let transaction = data.to_transaction(request.from_chain_id)?;

		tracing::debug!(
			from = request.from_chain_id,
			to = request.to_chain_id,
			amount = %request.amount,
			fee = %fee,
			"Relay quote received"
		);

		Ok(BridgeQuote {
			fee,
			amount: request.amount,
			transaction,
			estimated_gas: data.suggested_gas()?,
		})
	}

	fn adjust(&self, quote: &BridgeQuote, value: U256) -> Result<Transaction, BridgeError> {
		Ok(quote.transaction.with_value(value))
	}
}
