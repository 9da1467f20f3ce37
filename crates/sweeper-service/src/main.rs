//! Main entry point for the sweeper.
//!
//! Loads the configuration and the key file, asks which scenario to run
//! (unless `--scenario` is given) and processes every account in turn.

use clap::Parser;
use std::path::PathBuf;
use sweeper_account::{load_accounts, load_proxies};
use sweeper_config::Config;
use sweeper_service::{build_orchestrator, menu};

/// Command-line arguments for the sweeper.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Scenario name or menu number; prompts when omitted
	#[arg(short, long, env = "SWEEPER_SCENARIO")]
	scenario: Option<String>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let scenario = {
		let stdin = std::io::stdin();
		let mut input = stdin.lock();
		menu::choose_scenario(args.scenario.as_deref(), &mut input)?
	};
	let Some(scenario) = scenario else {
		return Ok(());
	};

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration from {}", args.config.display());

	let proxies = load_proxies(&config.files.proxies).await?;
	let accounts = load_accounts(&config.files.private_keys).await?;
	if accounts.is_empty() {
		tracing::warn!("No accounts in {}", config.files.private_keys);
		return Ok(());
	}
	if scenario.requires_destinations() {
		for account in &accounts {
			account.require_destination()?;
		}
	}
	tracing::info!(
		accounts = accounts.len(),
		proxies = proxies.len(),
		"Starting {}",
		scenario
	);

	let orchestrator = build_orchestrator(&config, scenario, &proxies)?;
	orchestrator.run(accounts).await;

	tracing::info!("Stopped sweeper");
	Ok(())
}
