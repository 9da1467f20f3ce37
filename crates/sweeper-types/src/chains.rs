//! Chain metadata for multi-chain sweeping and bridging.
//!
//! The registry is static for the lifetime of a run: built-in defaults for the
//! networks the tool knows about, with optional per-chain overrides taken from
//! configuration. It is read-only after construction and shared freely.

use crate::delivery::TransactionHash;
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Native currency descriptor of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NativeCurrency {
	/// Ticker, e.g. "ETH".
	pub symbol: String,
	/// Decimal places of the smallest unit.
	#[serde(default = "default_decimals")]
	pub decimals: u8,
}

fn default_decimals() -> u8 {
	18
}

impl NativeCurrency {
	pub fn new(symbol: &str) -> Self {
		Self {
			symbol: symbol.to_string(),
			decimals: 18,
		}
	}

	/// Case-insensitive currency match.
	pub fn matches(&self, symbol: &str) -> bool {
		self.symbol.eq_ignore_ascii_case(symbol)
	}
}

/// Configuration for a tracked token on a specific network.
///
/// * `address` - The on-chain address of the token contract
/// * `symbol` - The token symbol (e.g., "USDC")
/// * `decimals` - The number of decimal places for the token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TokenConfig {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
}

/// Stargate native pool deployment on a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StargateDeployment {
	/// Native pool contract.
	pub pool: Address,
	/// LayerZero v2 endpoint id of the chain.
	pub endpoint_id: u32,
}

/// Static metadata for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chain {
	pub name: String,
	pub chain_id: u64,
	pub currency: NativeCurrency,
	/// Transaction URL prefix; the hash is appended.
	pub explorer: String,
	pub rpc_urls: Vec<String>,
	#[serde(default)]
	pub tokens: Vec<TokenConfig>,
	#[serde(default)]
	pub stargate: Option<StargateDeployment>,
}

impl Chain {
	/// Get the first configured HTTP RPC URL.
	pub fn http_url(&self) -> Option<&str> {
		self.rpc_urls.first().map(String::as_str)
	}

	/// Explorer link for a submitted transaction.
	pub fn tx_url(&self, hash: &TransactionHash) -> String {
		format!("{}{}", self.explorer, hash)
	}
}

/// Partial chain description from configuration.
///
/// Fields left empty keep the built-in value. A name that is not built in
/// must provide `chain_id`, `currency` and at least one RPC URL.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChainOverride {
	#[serde(default)]
	pub chain_id: Option<u64>,
	#[serde(default)]
	pub currency: Option<String>,
	#[serde(default)]
	pub explorer: Option<String>,
	#[serde(default)]
	pub rpc_urls: Vec<String>,
	#[serde(default)]
	pub tokens: Vec<TokenConfig>,
	#[serde(default)]
	pub stargate_pool: Option<Address>,
	#[serde(default)]
	pub layerzero_eid: Option<u32>,
}

/// Read-only lookup of chains by name or id.
///
/// Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
	chains: HashMap<String, Chain>,
}

impl ChainRegistry {
	/// Creates a registry from an explicit list of chains.
	pub fn new(chains: Vec<Chain>) -> Self {
		Self {
			chains: chains
				.into_iter()
				.map(|chain| (chain.name.to_lowercase(), chain))
				.collect(),
		}
	}

	/// Registry pre-populated with the networks known out of the box.
	pub fn builtin() -> Self {
		Self::new(builtin_chains())
	}

	/// Applies a configuration override, inserting the chain if unknown.
	pub fn apply_override(&mut self, name: &str, update: &ChainOverride) -> Result<(), String> {
		let key = name.to_lowercase();
		if !self.chains.contains_key(&key) {
			let chain_id = update
				.chain_id
				.ok_or_else(|| format!("Chain {name} is not built in and has no chain_id"))?;
			let currency = update
				.currency
				.as_deref()
				.ok_or_else(|| format!("Chain {name} is not built in and has no currency"))?;
			if update.rpc_urls.is_empty() {
				return Err(format!("Chain {name} is not built in and has no rpc_urls"));
			}
			self.chains.insert(
				key.clone(),
				Chain {
					name: name.to_string(),
					chain_id,
					currency: NativeCurrency::new(currency),
					explorer: String::new(),
					rpc_urls: Vec::new(),
					tokens: Vec::new(),
					stargate: None,
				},
			);
		}
		let chain = self
			.chains
			.get_mut(&key)
			.ok_or_else(|| format!("Chain {name} could not be registered"))?;

		if let Some(chain_id) = update.chain_id {
			chain.chain_id = chain_id;
		}
		if let Some(currency) = &update.currency {
			chain.currency = NativeCurrency::new(currency);
		}
		if let Some(explorer) = &update.explorer {
			chain.explorer = explorer.clone();
		}
		if !update.rpc_urls.is_empty() {
			chain.rpc_urls = update.rpc_urls.clone();
		}
		if !update.tokens.is_empty() {
			chain.tokens = update.tokens.clone();
		}
		match (update.stargate_pool, update.layerzero_eid, chain.stargate) {
			(Some(pool), Some(endpoint_id), _) => {
				chain.stargate = Some(StargateDeployment { pool, endpoint_id })
			},
			(Some(pool), None, Some(existing)) => {
				chain.stargate = Some(StargateDeployment { pool, ..existing })
			},
			(None, Some(endpoint_id), Some(existing)) => {
				chain.stargate = Some(StargateDeployment {
					endpoint_id,
					..existing
				})
			},
			(None, None, _) => {},
			_ => {
				return Err(format!(
					"Chain {name} needs both stargate_pool and layerzero_eid"
				))
			},
		}
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&Chain> {
		self.chains.get(&name.to_lowercase())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.chains.contains_key(&name.to_lowercase())
	}

	pub fn iter(&self) -> impl Iterator<Item = &Chain> {
		self.chains.values()
	}
}

fn chain(name: &str, chain_id: u64, symbol: &str, explorer: &str, rpc: &str) -> Chain {
	Chain {
		name: name.to_string(),
		chain_id,
		currency: NativeCurrency::new(symbol),
		explorer: explorer.to_string(),
		rpc_urls: vec![rpc.to_string()],
		tokens: Vec::new(),
		stargate: None,
	}
}

fn with_stargate(mut chain: Chain, pool: Address, endpoint_id: u32) -> Chain {
	chain.stargate = Some(StargateDeployment { pool, endpoint_id });
	chain
}

fn builtin_chains() -> Vec<Chain> {
	vec![
		with_stargate(
			chain(
				"Ethereum",
				1,
				"ETH",
				"https://etherscan.io/tx/",
				"https://ethereum-rpc.publicnode.com",
			),
			address!("77b2043768d28e9c9ab44e1abfc95944bce57931"),
			30101,
		),
		with_stargate(
			chain(
				"Arbitrum",
				42161,
				"ETH",
				"https://arbiscan.io/tx/",
				"https://arb1.arbitrum.io/rpc",
			),
			address!("a45b5130f36cdca45667738e2a258ab09f4a5f7f"),
			30110,
		),
		with_stargate(
			chain(
				"Optimism",
				10,
				"ETH",
				"https://optimistic.etherscan.io/tx/",
				"https://mainnet.optimism.io",
			),
			address!("e8cdf27acd73a434d661c84887215f7598e7d0d3"),
			30111,
		),
		with_stargate(
			chain(
				"Base",
				8453,
				"ETH",
				"https://basescan.org/tx/",
				"https://mainnet.base.org",
			),
			address!("dc181bd607330aeebef6ea62e03e5e1fb4b6f7c7"),
			30184,
		),
		with_stargate(
			chain(
				"Linea",
				59144,
				"ETH",
				"https://lineascan.build/tx/",
				"https://rpc.linea.build",
			),
			address!("81f6138153d473e8c5ecebd3dc8cd4903506b075"),
			30183,
		),
		with_stargate(
			chain(
				"Scroll",
				534352,
				"ETH",
				"https://scrollscan.com/tx/",
				"https://rpc.scroll.io",
			),
			address!("c2b638cb5042c1b3c5d5c969361fb50569840583"),
			30214,
		),
		chain(
			"Zksync",
			324,
			"ETH",
			"https://era.zksync.network/tx/",
			"https://mainnet.era.zksync.io",
		),
		chain(
			"Zora",
			7777777,
			"ETH",
			"https://explorer.zora.energy/tx/",
			"https://rpc.zora.energy",
		),
		chain(
			"Blast",
			81457,
			"ETH",
			"https://blastscan.io/tx/",
			"https://rpc.blast.io",
		),
		chain(
			"Bsc",
			56,
			"BNB",
			"https://bscscan.com/tx/",
			"https://bsc-dataseed.bnbchain.org",
		),
		chain(
			"Polygon",
			137,
			"POL",
			"https://polygonscan.com/tx/",
			"https://polygon-rpc.com",
		),
		chain(
			"Avalanche",
			43114,
			"AVAX",
			"https://snowtrace.io/tx/",
			"https://api.avax.network/ext/bc/C/rpc",
		),
	]
}
