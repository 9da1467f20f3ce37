//! Declarative amount specifications.
//!
//! Configuration expresses how much to move as a pair of bounds written in one
//! of three forms:
//!
//! - `"0.1"` / `"0.2"`: a fixed range of native units
//! - `"40%"` / `"60%"`: a percentage range of the live balance
//! - `"-0.01"` / `"-0.02"`: a range of native units to leave behind
//!
//! Both bounds must use the same form. Anything else is rejected when the
//! configuration is loaded, before any value moves.

use crate::utils::parse_amount;
use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while turning a [`ValueRange`] into an [`AmountSpec`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountSpecError {
	/// Bounds use different forms, e.g. a percentage and a fixed amount.
	#[error("Mixed amount forms: '{from}' and '{to}' must both be numbers, percentages or leave-behind values")]
	MixedForms { from: String, to: String },
	/// A bound could not be parsed.
	#[error("Invalid amount '{0}'")]
	InvalidAmount(String),
	/// Percentages must lie within 0..=100.
	#[error("Percentage out of range: {0}")]
	PercentOutOfRange(String),
	/// Lower bound exceeds the upper bound.
	#[error("Inverted range: {from} > {to}")]
	Inverted { from: String, to: String },
}

/// Raw pair of bounds as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValueRange {
	pub from: String,
	pub to: String,
}

impl ValueRange {
	pub fn new(from: &str, to: &str) -> Self {
		Self {
			from: from.to_string(),
			to: to.to_string(),
		}
	}

	/// Parses the bounds into a typed spec for a currency with `decimals` places.
	pub fn to_spec(&self, decimals: u8) -> Result<AmountSpec, AmountSpecError> {
		AmountSpec::parse(&self.from, &self.to, decimals)
	}
}

/// A resolved, typed amount specification.
///
/// Fixed and leave-behind bounds are held in the currency's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountSpec {
	/// Send an amount sampled from `[min, max]`.
	Fixed { min: U256, max: U256 },
	/// Send a percentage of the balance sampled from `[min, max]`.
	Percent { min: Decimal, max: Decimal },
	/// Leave an amount sampled from `[min, max]`, send the rest.
	LeaveBehind { min: U256, max: U256 },
}

#[derive(Debug, PartialEq, Eq)]
enum Form {
	Fixed,
	Percent,
	LeaveBehind,
}

fn form_of(bound: &str) -> Form {
	if bound.contains('%') {
		Form::Percent
	} else if bound.starts_with('-') {
		Form::LeaveBehind
	} else {
		Form::Fixed
	}
}

impl AmountSpec {
	/// Parses a pair of configuration bounds.
	pub fn parse(from: &str, to: &str, decimals: u8) -> Result<Self, AmountSpecError> {
		let (from, to) = (from.trim(), to.trim());
		let form = form_of(from);
		if form != form_of(to) {
			return Err(AmountSpecError::MixedForms {
				from: from.to_string(),
				to: to.to_string(),
			});
		}

		match form {
			Form::Percent => {
				let min = parse_percent(from)?;
				let max = parse_percent(to)?;
				if min > max {
					return Err(AmountSpecError::Inverted {
						from: from.to_string(),
						to: to.to_string(),
					});
				}
				Ok(AmountSpec::Percent { min, max })
			},
			Form::LeaveBehind => {
				let min = parse_units(&from[1..], decimals)?;
				let max = parse_units(&to[1..], decimals)?;
				// An inverted leave-behind range is tolerated here: resolution
				// samples an empty interval and falls back to zero.
				Ok(AmountSpec::LeaveBehind { min, max })
			},
			Form::Fixed => {
				let min = parse_units(from, decimals)?;
				let max = parse_units(to, decimals)?;
				if min > max {
					return Err(AmountSpecError::Inverted {
						from: from.to_string(),
						to: to.to_string(),
					});
				}
				Ok(AmountSpec::Fixed { min, max })
			},
		}
	}

	/// Leave-behind spec with identical bounds.
	pub fn leave_exactly(amount: U256) -> Self {
		AmountSpec::LeaveBehind {
			min: amount,
			max: amount,
		}
	}

	/// Spec that always resolves to the whole balance.
	pub fn everything() -> Self {
		AmountSpec::Percent {
			min: Decimal::ONE_HUNDRED,
			max: Decimal::ONE_HUNDRED,
		}
	}
}

fn parse_percent(bound: &str) -> Result<Decimal, AmountSpecError> {
	let raw = bound.trim_end_matches('%').trim();
	let value = Decimal::from_str(raw)
		.map_err(|_| AmountSpecError::InvalidAmount(bound.to_string()))?;
	if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
		return Err(AmountSpecError::PercentOutOfRange(bound.to_string()));
	}
	Ok(value)
}

fn parse_units(bound: &str, decimals: u8) -> Result<U256, AmountSpecError> {
	if bound.starts_with('-') {
		return Err(AmountSpecError::InvalidAmount(bound.to_string()));
	}
	parse_amount(bound, decimals).map_err(|_| AmountSpecError::InvalidAmount(bound.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ether(s: &str) -> U256 {
		parse_amount(s, 18).unwrap()
	}

	#[test]
	fn test_parse_fixed() {
		let spec = AmountSpec::parse("0.1", "0.25", 18).unwrap();
		assert_eq!(
			spec,
			AmountSpec::Fixed {
				min: ether("0.1"),
				max: ether("0.25"),
			}
		);
	}

	#[test]
	fn test_parse_percent() {
		let spec = AmountSpec::parse("40%", "60.5%", 18).unwrap();
		assert_eq!(
			spec,
			AmountSpec::Percent {
				min: Decimal::from(40),
				max: Decimal::from_str("60.5").unwrap(),
			}
		);
	}

	#[test]
	fn test_parse_leave_behind() {
		let spec = AmountSpec::parse("-0.001", "-0.002", 18).unwrap();
		assert_eq!(
			spec,
			AmountSpec::LeaveBehind {
				min: ether("0.001"),
				max: ether("0.002"),
			}
		);
	}

	#[test]
	fn test_mixed_forms_rejected() {
		assert!(matches!(
			AmountSpec::parse("10%", "0.5", 18),
			Err(AmountSpecError::MixedForms { .. })
		));
		assert!(matches!(
			AmountSpec::parse("-0.1", "0.5", 18),
			Err(AmountSpecError::MixedForms { .. })
		));
	}

	#[test]
	fn test_percent_bounds_checked() {
		assert!(matches!(
			AmountSpec::parse("10%", "120%", 18),
			Err(AmountSpecError::PercentOutOfRange(_))
		));
		assert!(matches!(
			AmountSpec::parse("70%", "20%", 18),
			Err(AmountSpecError::Inverted { .. })
		));
	}

	#[test]
	fn test_garbage_rejected() {
		assert!(matches!(
			AmountSpec::parse("abc", "1", 18),
			Err(AmountSpecError::InvalidAmount(_))
		));
		assert!(matches!(
			AmountSpec::parse("--1", "-2", 18),
			Err(AmountSpecError::InvalidAmount(_))
		));
	}

	#[test]
	fn test_value_range_deserializes_from_toml() {
		let range: ValueRange = toml::from_str("from = \"50%\"\nto = \"100%\"").unwrap();
		assert_eq!(range, ValueRange::new("50%", "100%"));
		assert!(matches!(range.to_spec(18), Ok(AmountSpec::Percent { .. })));
	}
}
