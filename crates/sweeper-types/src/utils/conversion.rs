//! Conversions between human-readable decimal strings and on-chain units.

use alloy_primitives::{
	utils::{format_units, parse_units, UnitsError},
	U256,
};

/// Parses a decimal string such as `"0.015"` into the smallest unit.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
	parse_units(amount.trim(), decimals).map(|units| units.get_absolute())
}

/// Formats an amount with at most `precision` fractional digits, trailing
/// zeros removed.
pub fn format_amount(amount: U256, decimals: u8, precision: usize) -> String {
	let full = match format_units(amount, decimals) {
		Ok(full) => full,
		Err(_) => return amount.to_string(),
	};
	let Some((whole, fraction)) = full.split_once('.') else {
		return full;
	};
	let cut = &fraction[..fraction.len().min(precision)];
	let trimmed = cut.trim_end_matches('0');
	if trimmed.is_empty() {
		whole.to_string()
	} else {
		format!("{whole}.{trimmed}")
	}
}

/// Converts a gwei figure (possibly fractional) to wei.
pub fn gwei_to_wei(gwei: f64) -> u128 {
	if gwei <= 0.0 {
		return 0;
	}
	(gwei * 1_000_000_000f64).round() as u128
}
