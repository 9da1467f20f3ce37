//! Relay-backed swaps.
//!
//! A same-chain `EXACT_INPUT` quote from the token to the native currency
//! returns one or more steps, typically an approval followed by the swap.
//! Every item of every step is sent in order; a failure stops the sequence.

use crate::{SwapError, SwapInterface};
use async_trait::async_trait;
use std::sync::Arc;
use sweeper_account::AccountSigner;
use sweeper_bridge::relay_api::{RelayApiClient, RelayQuoteRequest};
use sweeper_delivery::DeliveryService;
use sweeper_types::{format_amount, TokenBalance, TransactionReceipt};

pub struct RelaySwap {
	api: Arc<RelayApiClient>,
	delivery: DeliveryService,
}

impl RelaySwap {
	pub fn new(api: Arc<RelayApiClient>, delivery: DeliveryService) -> Self {
		Self { api, delivery }
	}
}

#[async_trait]
impl SwapInterface for RelaySwap {
	async fn swap_to_native(
		&self,
		signer: &AccountSigner,
		balance: &TokenBalance,
	) -> Result<Vec<TransactionReceipt>, SwapError> {
		let request = RelayQuoteRequest::swap_to_native(
			signer.address(),
			balance.chain_id,
			balance.token.address,
			balance.amount,
		);
		let response = self.api.quote(&request).await?;

		let items: Vec<_> = response
			.steps
			.iter()
			.flat_map(|step| step.items.iter().map(move |item| (step.id.as_str(), item)))
			.collect();
		if items.is_empty() {
			return Err(SwapError::InvalidResponse(format!(
				"Swap quote for {} has no steps",
				balance.token.symbol
			)));
		}

		tracing::debug!(
			token = %balance.token.symbol,
			amount = %format_amount(balance.amount, balance.token.decimals, 6),
			steps = items.len(),
			"Executing swap"
		);

		let mut receipts = Vec::with_capacity(items.len());
		for (step, item) in items {
			let mut tx = item.data.to_transaction(balance.chain_id)?;
			tx.gas_limit = item.data.suggested_gas()?;
			let receipt = self.delivery.submit(signer, tx).await?;
			tracing::debug!(step, tx_hash = %receipt.hash, "Swap step confirmed");
			receipts.push(receipt);
		}

		Ok(receipts)
	}
}
