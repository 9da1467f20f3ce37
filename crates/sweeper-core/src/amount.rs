//! Resolution of declarative amount specs against a live balance.
//!
//! The result is never negative and never more than the balance it was
//! computed from. Leave-behind ranges that cannot be satisfied resolve to
//! zero after a bounded number of samples instead of looping.

use alloy_primitives::U256;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sweeper_types::AmountSpec;

/// Samples drawn for a leave-behind range before giving up.
pub const LEAVE_BEHIND_ATTEMPTS: usize = 10;

/// Percentages are sampled in thousandths of a percent.
const PERCENT_PRECISION: u64 = 1000;

/// Samples uniformly from the inclusive range `[low, high]`.
///
/// `low` must not exceed `high`.
pub(crate) fn sample_between<R: Rng + ?Sized>(rng: &mut R, low: U256, high: U256) -> U256 {
	let span = high - low;
	if span.is_zero() {
		return low;
	}
	if let Ok(span) = u128::try_from(span) {
		return low + U256::from(rng.random_range(0..=span));
	}
	let raw = U256::from_limbs(rng.random::<[u64; 4]>());
	match span.checked_add(U256::from(1u8)) {
		Some(modulus) => low + raw % modulus,
		None => raw,
	}
}

fn thousandths(percent: Decimal, round_up: bool) -> u64 {
	let scaled = percent * Decimal::from(PERCENT_PRECISION);
	let scaled = if round_up { scaled.ceil() } else { scaled.floor() };
	scaled.to_u64().unwrap_or(0)
}

/// Resolves `spec` into a concrete amount for an account holding `balance`.
pub fn resolve_amount<R: Rng + ?Sized>(spec: &AmountSpec, balance: U256, rng: &mut R) -> U256 {
	match spec {
		AmountSpec::Fixed { min, max } => sample_between(rng, *min, *max).min(balance),
		AmountSpec::Percent { min, max } => {
			let high = thousandths(*max, false);
			let low = thousandths(*min, true).min(high);
			let portion = rng.random_range(low..=high);
			balance * U256::from(portion) / U256::from(100 * PERCENT_PRECISION)
		},
		AmountSpec::LeaveBehind { min, max } => {
			// Sending balance - leave for leave in [min, max] is the same as
			// sampling the send amount from [balance - max, balance - min].
			for _ in 0..LEAVE_BEHIND_ATTEMPTS {
				if min > max {
					continue;
				}
				let leave = sample_between(rng, *min, *max);
				if let Some(amount) = balance.checked_sub(leave) {
					return amount;
				}
			}
			U256::ZERO
		},
	}
}
