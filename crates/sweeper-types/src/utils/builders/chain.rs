//! Builder for Chain

use crate::chains::{Chain, NativeCurrency, StargateDeployment, TokenConfig};
use alloy_primitives::Address;

/// Fluent builder for [`Chain`] fixtures.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
	chain: Chain,
}

impl ChainBuilder {
	pub fn new(name: &str, chain_id: u64) -> Self {
		Self {
			chain: Chain {
				name: name.to_string(),
				chain_id,
				currency: NativeCurrency::new("ETH"),
				explorer: format!("https://explorer.{}/tx/", name.to_lowercase()),
				rpc_urls: vec![format!("http://localhost:{}", 8545 + chain_id % 1000)],
				tokens: Vec::new(),
				stargate: None,
			},
		}
	}

	pub fn currency(mut self, symbol: &str) -> Self {
		self.chain.currency = NativeCurrency::new(symbol);
		self
	}

	pub fn rpc_url(mut self, url: &str) -> Self {
		self.chain.rpc_urls = vec![url.to_string()];
		self
	}

	pub fn token(mut self, address: Address, symbol: &str, decimals: u8) -> Self {
		self.chain.tokens.push(TokenConfig {
			address,
			symbol: symbol.to_string(),
			decimals,
		});
		self
	}

	pub fn stargate(mut self, pool: Address, endpoint_id: u32) -> Self {
		self.chain.stargate = Some(StargateDeployment { pool, endpoint_id });
		self
	}

	pub fn build(self) -> Chain {
		self.chain
	}
}
