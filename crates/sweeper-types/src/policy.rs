//! Retry, delay and outcome values shared by the orchestration layer.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded fixed-interval retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	/// Pause between attempts.
	pub interval: Duration,
	/// Whether the last error is returned once attempts run out. When false the
	/// caller receives "no result" and treats the operation as not having happened.
	pub propagate_on_exhaustion: bool,
}

impl RetryPolicy {
	pub fn new(max_attempts: u32, interval: Duration) -> Self {
		Self {
			max_attempts,
			interval,
			propagate_on_exhaustion: false,
		}
	}

	pub fn propagating(self) -> Self {
		Self {
			propagate_on_exhaustion: true,
			..self
		}
	}
}

/// Inclusive range of whole seconds used for humanized pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DelayRange {
	pub from: u64,
	pub to: u64,
}

impl DelayRange {
	pub fn new(from: u64, to: u64) -> Self {
		Self { from, to }
	}

	pub fn is_ordered(&self) -> bool {
		self.from <= self.to
	}

	/// Samples a pause from the range.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
		let (low, high) = if self.is_ordered() {
			(self.from, self.to)
		} else {
			(self.to, self.from)
		};
		Duration::from_secs(rng.random_range(low..=high))
	}
}

/// Result of one orchestrated step for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
	/// The step moved value or changed on-chain state.
	Effect,
	/// The step completed but had nothing to do.
	NoEffect,
	/// The step gave up after exhausting retries.
	Failed,
}

impl ActionOutcome {
	pub fn has_effect(&self) -> bool {
		matches!(self, ActionOutcome::Effect)
	}
}
