//! Named scenarios an operator can pick.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown scenario '{0}'")]
pub struct UnknownScenario(pub String);

/// Fixed step sequences the batch can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
	/// Report non-zero native and token balances.
	BalanceChecker,
	/// Swap tracked tokens to native currency.
	GarbageCollector,
	/// Sweep, then forward native funds to each account's destination.
	GarbageCollectorAndNativeSender,
	RelayBridge,
	StargateBridge,
}

impl Scenario {
	pub const ALL: [Scenario; 5] = [
		Scenario::BalanceChecker,
		Scenario::GarbageCollector,
		Scenario::GarbageCollectorAndNativeSender,
		Scenario::RelayBridge,
		Scenario::StargateBridge,
	];

	pub fn name(&self) -> &'static str {
		match self {
			Scenario::BalanceChecker => "Balance checker",
			Scenario::GarbageCollector => "Garbage collector",
			Scenario::GarbageCollectorAndNativeSender => "Garbage collector & native sender",
			Scenario::RelayBridge => "Relay bridge",
			Scenario::StargateBridge => "Stargate bridge",
		}
	}

	/// Whether every account needs a destination address in the key file.
	pub fn requires_destinations(&self) -> bool {
		matches!(self, Scenario::GarbageCollectorAndNativeSender)
	}

	/// Names of every scenario joined for display.
	pub fn list() -> String {
		Self::ALL
			.iter()
			.map(Scenario::name)
			.collect::<Vec<_>>()
			.join(" | ")
	}
}

impl fmt::Display for Scenario {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Accepts a scenario name (case-insensitive) or its 1-based menu number.
impl FromStr for Scenario {
	type Err = UnknownScenario;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let input = s.trim();
		if let Ok(number) = input.parse::<usize>() {
			return number
				.checked_sub(1)
				.and_then(|i| Self::ALL.get(i).copied())
				.ok_or_else(|| UnknownScenario(input.to_string()));
		}
		Self::ALL
			.iter()
			.copied()
			.find(|scenario| scenario.name().eq_ignore_ascii_case(input))
			.ok_or_else(|| UnknownScenario(input.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_by_name_and_number() {
		assert_eq!("relay bridge".parse::<Scenario>(), Ok(Scenario::RelayBridge));
		assert_eq!(
			" Garbage collector & native sender ".parse::<Scenario>(),
			Ok(Scenario::GarbageCollectorAndNativeSender)
		);
		assert_eq!("1".parse::<Scenario>(), Ok(Scenario::BalanceChecker));
		assert_eq!("5".parse::<Scenario>(), Ok(Scenario::StargateBridge));
	}

	#[test]
	fn test_unknown_input() {
		assert!("0".parse::<Scenario>().is_err());
		assert!("6".parse::<Scenario>().is_err());
		assert_eq!(
			"bridge everything".parse::<Scenario>(),
			Err(UnknownScenario("bridge everything".into()))
		);
	}

	#[test]
	fn test_only_native_sender_needs_destinations() {
		let requiring: Vec<_> = Scenario::ALL
			.iter()
			.filter(|s| s.requires_destinations())
			.collect();
		assert_eq!(requiring, vec![&Scenario::GarbageCollectorAndNativeSender]);
		assert!(Scenario::list().contains("Stargate bridge"));
	}
}
