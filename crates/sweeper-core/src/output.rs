//! Operator-facing terminal lines.
//!
//! Structured events go through `tracing`; these helpers only format the
//! few lines an operator watches for while a batch runs.

use alloy_primitives::Address;
use colored::Colorize;
use sweeper_types::{Chain, TransactionHash};

/// Banner printed before an account is processed, e.g. `#3/10 0xabc...`.
pub fn account_banner(index: usize, total: usize, address: Address) -> String {
	format!("#{}/{} {}", index, total, address)
		.bold()
		.cyan()
		.to_string()
}

/// Success line with an explorer link for a confirmed transaction.
pub fn success_line(action: &str, chain: &Chain, hash: &TransactionHash) -> String {
	format!(
		"{} {} on {}: {}",
		"✔".green(),
		action,
		chain.name,
		chain.tx_url(hash).underline()
	)
}
