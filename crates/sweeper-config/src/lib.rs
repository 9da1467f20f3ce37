//! Configuration module for the sweeper.
//!
//! This module provides structures and utilities for managing run
//! configuration. Configuration is loaded from a TOML file once at startup,
//! environment variables are substituted, and the result is validated before
//! any account is touched. The validated value is then passed by reference to
//! every component; nothing reads ambient global state.

use alloy_primitives::U256;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use sweeper_types::{
	parse_amount, AmountSpec, AmountSpecError, ChainOverride, ChainRegistry, DelayRange,
	RetryPolicy, ValueRange,
};
use thiserror::Error;

/// Decimal places of every native currency in the registry.
pub const NATIVE_DECIMALS: u8 = 18;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
	/// A value range could not be turned into an amount specification.
	#[error("Invalid values in [{section}]: {source}")]
	Amount {
		section: String,
		#[source]
		source: AmountSpecError,
	},
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Input files.
	#[serde(default)]
	pub files: FilesConfig,
	/// Retry policy applied to every network action.
	#[serde(default)]
	pub retry: RetryConfig,
	/// Gas price gating.
	#[serde(default)]
	pub gas: GasConfig,
	/// Humanized pauses and ordering.
	#[serde(default)]
	pub timing: TimingConfig,
	/// Per-chain overrides merged onto the built-in registry.
	#[serde(default)]
	pub chains: HashMap<String, ChainOverride>,
	/// Token sweeping.
	#[serde(default)]
	pub garbage_collector: Option<GarbageCollectorConfig>,
	/// Native forwarding to destination addresses.
	#[serde(default)]
	pub native_sender: Option<NativeSenderConfig>,
	/// Relay bridge routing.
	#[serde(default)]
	pub relay: Option<RelayConfig>,
	/// Stargate bridge routing.
	#[serde(default)]
	pub stargate: Option<StargateConfig>,
}

/// Locations of the key and proxy files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
	#[serde(default = "default_private_keys")]
	pub private_keys: String,
	#[serde(default = "default_proxies")]
	pub proxies: String,
}

impl Default for FilesConfig {
	fn default() -> Self {
		Self {
			private_keys: default_private_keys(),
			proxies: default_proxies(),
		}
	}
}

fn default_private_keys() -> String {
	"privates.txt".to_string()
}

fn default_proxies() -> String {
	"proxies.txt".to_string()
}

/// Retry settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
	/// Attempts per action, including the first one.
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	/// Fixed pause between attempts in milliseconds.
	#[serde(default = "default_retry_interval_ms")]
	pub interval_ms: u64,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: default_max_attempts(),
			interval_ms: default_retry_interval_ms(),
		}
	}
}

fn default_max_attempts() -> u32 {
	3
}

fn default_retry_interval_ms() -> u64 {
	10_000
}

/// Gas price ceiling for value-moving actions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GasConfig {
	/// Chain whose gas price is watched.
	#[serde(default = "default_gas_chain")]
	pub chain: String,
	/// Highest acceptable gas price in gwei.
	#[serde(default = "default_max_gwei")]
	pub max_gwei: f64,
	/// Seconds between gas price polls.
	#[serde(default = "default_gas_poll_interval")]
	pub poll_interval_seconds: u64,
}

impl Default for GasConfig {
	fn default() -> Self {
		Self {
			chain: default_gas_chain(),
			max_gwei: default_max_gwei(),
			poll_interval_seconds: default_gas_poll_interval(),
		}
	}
}

fn default_gas_chain() -> String {
	"Ethereum".to_string()
}

fn default_max_gwei() -> f64 {
	20.0
}

fn default_gas_poll_interval() -> u64 {
	60
}

/// Account ordering and pauses, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
	#[serde(default)]
	pub shuffle_wallets: bool,
	#[serde(default = "default_between_accounts")]
	pub between_accounts: DelayRange,
	#[serde(default = "default_between_actions")]
	pub between_actions: DelayRange,
}

impl Default for TimingConfig {
	fn default() -> Self {
		Self {
			shuffle_wallets: false,
			between_accounts: default_between_accounts(),
			between_actions: default_between_actions(),
		}
	}
}

fn default_between_accounts() -> DelayRange {
	DelayRange::new(100, 200)
}

fn default_between_actions() -> DelayRange {
	DelayRange::new(10, 20)
}

/// Token sweeping settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GarbageCollectorConfig {
	/// Chains whose tracked tokens are swept.
	pub chains: Vec<String>,
	/// Balances at or below this raw amount are ignored.
	#[serde(default)]
	pub min_token_balance: u64,
}

/// Native forwarding settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NativeSenderConfig {
	/// Chain the native balance is forwarded on.
	pub chain: String,
	/// Amounts at or below this are dust and never forwarded.
	#[serde(default = "default_min_to_send")]
	pub min_to_send: String,
	/// Safety factor applied to the estimated transfer cost.
	#[serde(default = "default_gas_multiplier")]
	pub gas_multiplier: f64,
	/// Extra amount to leave on top of the gas reserve, e.g. `-0.001`..`-0.002`.
	#[serde(default)]
	pub values: Option<ValueRange>,
}

fn default_min_to_send() -> String {
	"0.0001".to_string()
}

fn default_gas_multiplier() -> f64 {
	1.6
}

impl NativeSenderConfig {
	/// Dust threshold in wei.
	pub fn min_to_send_wei(&self) -> Result<U256, ConfigError> {
		parse_amount(&self.min_to_send, NATIVE_DECIMALS).map_err(|e| {
			ConfigError::Validation(format!("native_sender.min_to_send is invalid: {e}"))
		})
	}

	/// Extra leave-behind bounds in wei, zero when not configured.
	pub fn extra_leave_behind(&self) -> Result<(U256, U256), ConfigError> {
		match &self.values {
			None => Ok((U256::ZERO, U256::ZERO)),
			Some(range) => match range.to_spec(NATIVE_DECIMALS) {
				Ok(AmountSpec::LeaveBehind { min, max }) => Ok((min, max)),
				Ok(_) => Err(ConfigError::Validation(
					"native_sender.values must be leave-behind values such as \"-0.001\"".into(),
				)),
				Err(source) => Err(ConfigError::Amount {
					section: "native_sender".into(),
					source,
				}),
			},
		}
	}
}

/// Settings shared by every bridge backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
	/// Candidate source chains, tried in random order.
	pub from_networks: Vec<String>,
	/// Destination chain.
	pub to_network: String,
	/// How much to bridge from each candidate.
	pub values: ValueRange,
	/// Smallest amount worth bridging, in native units.
	pub min_to_bridge: String,
	/// Whether the bridge fee and gas come out of the bridged amount.
	#[serde(default = "default_true")]
	pub deduct_fee: bool,
	/// Whether candidate chains are shuffled before trying them.
	#[serde(default = "default_true")]
	pub shuffle_networks: bool,
}

fn default_true() -> bool {
	true
}

impl BridgeConfig {
	pub fn amount_spec(&self, section: &str) -> Result<AmountSpec, ConfigError> {
		self.values
			.to_spec(NATIVE_DECIMALS)
			.map_err(|source| ConfigError::Amount {
				section: section.to_string(),
				source,
			})
	}

	pub fn min_to_bridge_wei(&self, section: &str) -> Result<U256, ConfigError> {
		parse_amount(&self.min_to_bridge, NATIVE_DECIMALS).map_err(|e| {
			ConfigError::Validation(format!("{section}.min_to_bridge is invalid: {e}"))
		})
	}
}

/// Relay bridge settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
	#[serde(flatten)]
	pub bridge: BridgeConfig,
	#[serde(default = "default_relay_api_url")]
	pub api_url: String,
}

fn default_relay_api_url() -> String {
	"https://api.relay.link".to_string()
}

/// Stargate bridge settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StargateConfig {
	#[serde(flatten)]
	pub bridge: BridgeConfig,
	/// Accepted slippage between sent and received amount, in basis points.
	#[serde(default = "default_slippage_bps")]
	pub slippage_bps: u32,
}

fn default_slippage_bps() -> u32 {
	50
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let var_name = var_name.as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{var_name}' not found"
					)))
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		tracing::debug!("Reading configuration from {}", path.display());
		let content = tokio::fs::read_to_string(path).await?;
		content.parse()
	}

	/// Retry policy that degrades to "no result" once attempts run out.
	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy::new(
			self.retry.max_attempts,
			Duration::from_millis(self.retry.interval_ms),
		)
	}

	/// Built-in chain registry with configured overrides applied.
	pub fn chain_registry(&self) -> Result<ChainRegistry, ConfigError> {
		let mut registry = ChainRegistry::builtin();
		let mut names: Vec<&String> = self.chains.keys().collect();
		names.sort();
		for name in names {
			registry
				.apply_override(name, &self.chains[name])
				.map_err(ConfigError::Validation)?;
		}
		Ok(registry)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// Checks retry bounds, delay ordering, that every amount range parses
	/// into exactly one form, and that every referenced chain is known.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.retry.max_attempts == 0 {
			return Err(ConfigError::Validation(
				"retry.max_attempts must be at least 1".into(),
			));
		}
		if !self.timing.between_accounts.is_ordered() {
			return Err(ConfigError::Validation(
				"timing.between_accounts must have from <= to".into(),
			));
		}
		if !self.timing.between_actions.is_ordered() {
			return Err(ConfigError::Validation(
				"timing.between_actions must have from <= to".into(),
			));
		}
		if !(self.gas.max_gwei > 0.0) {
			return Err(ConfigError::Validation(
				"gas.max_gwei must be greater than 0".into(),
			));
		}
		if self.gas.poll_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"gas.poll_interval_seconds must be greater than 0".into(),
			));
		}

		let registry = self.chain_registry()?;
		let require_chain = |section: &str, name: &str| -> Result<(), ConfigError> {
			if registry.contains(name) {
				Ok(())
			} else {
				Err(ConfigError::Validation(format!(
					"{section} references unknown chain '{name}'"
				)))
			}
		};

		require_chain("gas", &self.gas.chain)?;

		if let Some(gc) = &self.garbage_collector {
			if gc.chains.is_empty() {
				return Err(ConfigError::Validation(
					"garbage_collector.chains cannot be empty".into(),
				));
			}
			for chain in &gc.chains {
				require_chain("garbage_collector", chain)?;
			}
		}

		if let Some(sender) = &self.native_sender {
			require_chain("native_sender", &sender.chain)?;
			sender.min_to_send_wei()?;
			sender.extra_leave_behind()?;
			if !(sender.gas_multiplier >= 1.0) {
				return Err(ConfigError::Validation(
					"native_sender.gas_multiplier must be at least 1.0".into(),
				));
			}
		}

		let bridges = [
			("relay", self.relay.as_ref().map(|r| &r.bridge)),
			("stargate", self.stargate.as_ref().map(|s| &s.bridge)),
		];
		for (section, bridge) in bridges {
			let Some(bridge) = bridge else { continue };
			if bridge.from_networks.is_empty() {
				return Err(ConfigError::Validation(format!(
					"{section}.from_networks cannot be empty"
				)));
			}
			for chain in &bridge.from_networks {
				require_chain(section, chain)?;
			}
			require_chain(section, &bridge.to_network)?;
			bridge.amount_spec(section)?;
			bridge.min_to_bridge_wei(section)?;
		}

		if let Some(stargate) = &self.stargate {
			if stargate.slippage_bps >= 10_000 {
				return Err(ConfigError::Validation(
					"stargate.slippage_bps must be below 10000".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const FULL_CONFIG: &str = r#"
[retry]
max_attempts = 5
interval_ms = 2000

[gas]
chain = "Ethereum"
max_gwei = 12.5

[timing]
shuffle_wallets = true
between_accounts = { from = 60, to = 120 }
between_actions = { from = 5, to = 10 }

[chains.Arbitrum]
rpc_urls = ["http://localhost:8545"]
tokens = [{ address = "0xaf88d065e77c8cc2239327c5edb3a432268e5831", symbol = "USDC", decimals = 6 }]

[garbage_collector]
chains = ["Arbitrum", "Base"]

[native_sender]
chain = "Arbitrum"
min_to_send = "0.0005"

[relay]
from_networks = ["Arbitrum", "Optimism", "Base"]
to_network = "Linea"
values = { from = "90%", to = "100%" }
min_to_bridge = "0.001"
deduct_fee = true

[stargate]
from_networks = ["Arbitrum"]
to_network = "Base"
values = { from = "-0.001", to = "-0.002" }
min_to_bridge = "0.01"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("SWEEPER_TEST_HOST", "localhost");
		std::env::set_var("SWEEPER_TEST_PORT", "8545");

		let input = "url = \"http://${SWEEPER_TEST_HOST}:${SWEEPER_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545\"");

		std::env::remove_var("SWEEPER_TEST_HOST");
		std::env::remove_var("SWEEPER_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${SWEEPER_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${SWEEPER_MISSING_VAR}\"");
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("SWEEPER_MISSING_VAR"));
	}

	#[test]
	fn test_full_config_parses() {
		let config: Config = FULL_CONFIG.parse().unwrap();

		assert_eq!(config.retry.max_attempts, 5);
		assert_eq!(config.gas.max_gwei, 12.5);
		assert!(config.timing.shuffle_wallets);
		assert_eq!(config.timing.between_accounts, DelayRange::new(60, 120));

		let relay = config.relay.as_ref().unwrap();
		assert_eq!(relay.api_url, "https://api.relay.link");
		assert!(relay.bridge.shuffle_networks);
		assert!(matches!(
			relay.bridge.amount_spec("relay").unwrap(),
			AmountSpec::Percent { .. }
		));

		let stargate = config.stargate.as_ref().unwrap();
		assert_eq!(stargate.slippage_bps, 50);
		assert!(stargate.bridge.deduct_fee);

		let registry = config.chain_registry().unwrap();
		let arbitrum = registry.get("Arbitrum").unwrap();
		assert_eq!(arbitrum.rpc_urls, vec!["http://localhost:8545".to_string()]);
		assert_eq!(arbitrum.tokens[0].symbol, "USDC");
	}

	#[test]
	fn test_defaults_for_empty_config() {
		let config: Config = "".parse().unwrap();
		assert_eq!(config.retry.max_attempts, 3);
		assert_eq!(config.retry.interval_ms, 10_000);
		assert_eq!(config.gas.chain, "Ethereum");
		assert_eq!(config.files.private_keys, "privates.txt");
		assert!(config.relay.is_none());

		let policy = config.retry_policy();
		assert_eq!(policy.interval, Duration::from_secs(10));
		assert!(!policy.propagate_on_exhaustion);
	}

	#[test]
	fn test_mixed_values_rejected() {
		let config = r#"
[relay]
from_networks = ["Arbitrum"]
to_network = "Base"
values = { from = "10%", to = "0.5" }
min_to_bridge = "0.001"
"#;
		let err = config.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Amount { .. }));
	}

	#[test]
	fn test_unknown_chain_rejected() {
		let config = r#"
[garbage_collector]
chains = ["Narnia"]
"#;
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Narnia"));
	}

	#[test]
	fn test_zero_attempts_rejected() {
		let err = "[retry]\nmax_attempts = 0".parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("max_attempts"));
	}

	#[test]
	fn test_inverted_delay_rejected() {
		let config = "[timing]\nbetween_accounts = { from = 10, to = 5 }";
		assert!(config.parse::<Config>().is_err());
	}

	#[test]
	fn test_native_sender_values_must_leave_behind() {
		let config = r#"
[native_sender]
chain = "Base"
values = { from = "0.1", to = "0.2" }
"#;
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("leave-behind"));

		let config = r#"
[native_sender]
chain = "Base"
values = { from = "-0.001", to = "-0.002" }
"#;
		let parsed: Config = config.parse().unwrap();
		let (min, max) = parsed
			.native_sender
			.unwrap()
			.extra_leave_behind()
			.unwrap();
		assert_eq!(min, U256::from(1_000_000_000_000_000u64));
		assert_eq!(max, U256::from(2_000_000_000_000_000u64));
	}

	#[tokio::test]
	async fn test_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(FULL_CONFIG.as_bytes()).unwrap();

		let config = Config::from_file(file.path()).await.unwrap();
		assert_eq!(config.garbage_collector.unwrap().chains.len(), 2);
	}

	#[test]
	fn test_example_config_is_valid() {
		let config: Config = include_str!("../../../config/example.toml").parse().unwrap();
		assert!(config.native_sender.is_some());
		assert_eq!(config.stargate.unwrap().slippage_bps, 50);
		assert_eq!(
			config.relay.unwrap().bridge.amount_spec("relay").unwrap(),
			AmountSpec::LeaveBehind {
				min: parse_amount("0.0005", 18).unwrap(),
				max: parse_amount("0.001", 18).unwrap(),
			}
		);
	}
}
