//! Builds the orchestrator for a scenario from configuration.
//!
//! Only the chains a scenario touches get an RPC client, so a run does not
//! depend on endpoints it never uses.

use alloy_primitives::U256;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use sweeper_bridge::{BridgeInterface, RelayApiClient, RelayBridge, StargateBridge};
use sweeper_config::Config;
use sweeper_core::{
	AccountOrchestrator, AccountStep, BalanceReporter, BalanceSweeper, BridgeRoute, BridgeRouter,
	BridgeStep, GasGate, NativeForwarder, Scenario,
};
use sweeper_delivery::implementations::evm::alloy::AlloyDelivery;
use sweeper_delivery::DeliveryService;
use sweeper_swap::RelaySwap;
use sweeper_types::{Chain, ChainRegistry};

type BuildError = Box<dyn std::error::Error>;

const DEFAULT_RELAY_API: &str = "https://api.relay.link";

/// Chain names a scenario needs a client for, the gas chain included.
fn chains_for(config: &Config, scenario: Scenario) -> Result<BTreeSet<String>, BuildError> {
	let mut names = BTreeSet::from([config.gas.chain.clone()]);
	match scenario {
		Scenario::BalanceChecker | Scenario::GarbageCollector => {
			names.extend(garbage_collector(config, scenario)?.chains.iter().cloned());
		},
		Scenario::GarbageCollectorAndNativeSender => {
			names.extend(garbage_collector(config, scenario)?.chains.iter().cloned());
			names.insert(native_sender(config)?.chain.clone());
		},
		Scenario::RelayBridge => {
			let relay = relay(config)?;
			names.extend(relay.bridge.from_networks.iter().cloned());
			names.insert(relay.bridge.to_network.clone());
		},
		Scenario::StargateBridge => {
			let stargate = stargate(config)?;
			names.extend(stargate.bridge.from_networks.iter().cloned());
			names.insert(stargate.bridge.to_network.clone());
		},
	}
	Ok(names)
}

fn missing(section: &str, scenario: Scenario) -> BuildError {
	format!("Scenario '{}' requires a [{}] section", scenario, section).into()
}

fn garbage_collector(
	config: &Config,
	scenario: Scenario,
) -> Result<&sweeper_config::GarbageCollectorConfig, BuildError> {
	config
		.garbage_collector
		.as_ref()
		.ok_or_else(|| missing("garbage_collector", scenario))
}

fn native_sender(config: &Config) -> Result<&sweeper_config::NativeSenderConfig, BuildError> {
	config
		.native_sender
		.as_ref()
		.ok_or_else(|| missing("native_sender", Scenario::GarbageCollectorAndNativeSender))
}

fn relay(config: &Config) -> Result<&sweeper_config::RelayConfig, BuildError> {
	config
		.relay
		.as_ref()
		.ok_or_else(|| missing("relay", Scenario::RelayBridge))
}

fn stargate(config: &Config) -> Result<&sweeper_config::StargateConfig, BuildError> {
	config
		.stargate
		.as_ref()
		.ok_or_else(|| missing("stargate", Scenario::StargateBridge))
}

fn lookup(registry: &ChainRegistry, name: &str) -> Result<Chain, BuildError> {
	registry
		.get(name)
		.cloned()
		.ok_or_else(|| format!("Unknown chain '{}'", name).into())
}

fn build_delivery(
	registry: &ChainRegistry,
	names: &BTreeSet<String>,
) -> Result<DeliveryService, BuildError> {
	let mut delivery = DeliveryService::default();
	for name in names {
		let chain = lookup(registry, name)?;
		let client = AlloyDelivery::new(&chain)?;
		tracing::debug!(chain = %chain.name, chain_id = chain.chain_id, "Created RPC client");
		delivery.insert(chain.chain_id, Arc::new(client));
	}
	Ok(delivery)
}

/// Builds the orchestrator running `scenario`.
///
/// `proxies` are used by the Relay HTTP client; an empty list means direct
/// connections.
pub fn build_orchestrator(
	config: &Config,
	scenario: Scenario,
	proxies: &[String],
) -> Result<AccountOrchestrator, BuildError> {
	let registry = config.chain_registry()?;
	let delivery = build_delivery(&registry, &chains_for(config, scenario)?)?;
	let retry = config.retry_policy();
	let timing = &config.timing;

	let relay_api = || -> Result<Arc<RelayApiClient>, BuildError> {
		let url = config
			.relay
			.as_ref()
			.map(|relay| relay.api_url.as_str())
			.unwrap_or(DEFAULT_RELAY_API);
		Ok(Arc::new(RelayApiClient::new(url, proxies)?))
	};
	let sweeper = || -> Result<BalanceSweeper, BuildError> {
		let gc = garbage_collector(config, scenario)?;
		let chains = gc
			.chains
			.iter()
			.map(|name| lookup(&registry, name))
			.collect::<Result<Vec<_>, _>>()?;
		let swap = RelaySwap::new(relay_api()?, delivery.clone());
		Ok(BalanceSweeper::new(
			delivery.clone(),
			Arc::new(swap),
			chains,
			U256::from(gc.min_token_balance),
			retry,
		))
	};
	let bridge_step = |name: &'static str,
	                   bridge: Arc<dyn BridgeInterface>,
	                   route: BridgeRoute|
	 -> Box<dyn AccountStep> {
		let router = BridgeRouter::new(bridge, delivery.clone(), retry, timing.between_actions);
		Box::new(BridgeStep::new(name, router, route))
	};

	let steps: Vec<Box<dyn AccountStep>> = match scenario {
		Scenario::BalanceChecker => {
			let gc = garbage_collector(config, scenario)?;
			let chains = gc
				.chains
				.iter()
				.map(|name| lookup(&registry, name))
				.collect::<Result<Vec<_>, _>>()?;
			vec![Box::new(BalanceReporter::new(delivery.clone(), chains, retry))]
		},
		Scenario::GarbageCollector => vec![Box::new(sweeper()?)],
		Scenario::GarbageCollectorAndNativeSender => {
			let sender = native_sender(config)?;
			let forwarder = NativeForwarder::new(
				delivery.clone(),
				lookup(&registry, &sender.chain)?,
				sender.min_to_send_wei()?,
				sender.gas_multiplier,
				sender.extra_leave_behind()?,
				retry,
			);
			vec![Box::new(sweeper()?), Box::new(forwarder)]
		},
		Scenario::RelayBridge => {
			let relay = relay(config)?;
			let route = BridgeRoute::from_config(&relay.bridge, "relay", &registry)?;
			let backend: Arc<dyn BridgeInterface> = Arc::new(RelayBridge::new(relay_api()?));
			vec![bridge_step("relay bridge", backend, route)]
		},
		Scenario::StargateBridge => {
			let stargate = stargate(config)?;
			let route = BridgeRoute::from_config(&stargate.bridge, "stargate", &registry)?;
			let backend: Arc<dyn BridgeInterface> = Arc::new(StargateBridge::new(
				delivery.clone(),
				&registry,
				stargate.slippage_bps,
			));
			vec![bridge_step("stargate bridge", backend, route)]
		},
	};

	let gas_chain = lookup(&registry, &config.gas.chain)?;
	let gas_gate = GasGate::new(
		delivery.clone(),
		&gas_chain,
		config.gas.max_gwei,
		Duration::from_secs(config.gas.poll_interval_seconds),
	);

	tracing::info!(
		scenario = %scenario,
		steps = steps.len(),
		gas_chain = %gas_chain.name,
		"Built orchestrator"
	);

	Ok(AccountOrchestrator::new(
		steps,
		Some(gas_gate),
		timing.between_accounts,
		timing.between_actions,
		timing.shuffle_wallets,
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	const CONFIG: &str = r#"
[gas]
chain = "Ethereum"
max_gwei = 15.0

[garbage_collector]
chains = ["Arbitrum", "Optimism"]

[relay]
from_networks = ["Arbitrum", "Optimism"]
to_network = "Base"
values = { from = "-0.001", to = "-0.002" }
min_to_bridge = "0.005"
"#;

	#[tokio::test]
	async fn test_clients_only_for_used_chains() {
		let config: Config = CONFIG.parse().unwrap();
		let names = chains_for(&config, Scenario::RelayBridge).unwrap();
		assert_eq!(
			names.into_iter().collect::<Vec<_>>(),
			vec!["Arbitrum", "Base", "Ethereum", "Optimism"]
		);
	}

	#[tokio::test]
	async fn test_builds_configured_scenarios() {
		let config: Config = CONFIG.parse().unwrap();
		assert!(build_orchestrator(&config, Scenario::BalanceChecker, &[]).is_ok());
		assert!(build_orchestrator(&config, Scenario::GarbageCollector, &[]).is_ok());
		assert!(build_orchestrator(&config, Scenario::RelayBridge, &[]).is_ok());
	}

	#[tokio::test]
	async fn test_missing_section_is_reported() {
		let config: Config = CONFIG.parse().unwrap();
		let err = build_orchestrator(&config, Scenario::StargateBridge, &[])
			.err()
			.unwrap();
		assert!(err.to_string().contains("[stargate]"));

		let err = build_orchestrator(&config, Scenario::GarbageCollectorAndNativeSender, &[])
			.err()
			.unwrap();
		assert!(err.to_string().contains("[native_sender]"));
	}
}
