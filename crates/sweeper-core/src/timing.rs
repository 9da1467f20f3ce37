//! Humanized pauses between actions and accounts.

use std::time::Duration;
use sweeper_types::DelayRange;

/// Sleeps for a duration sampled from `range` and returns it.
pub async fn pause(range: &DelayRange, reason: &str) -> Duration {
	// ThreadRng is not Send, sample before suspending.
	let duration = range.sample(&mut rand::rng());
	if !duration.is_zero() {
		tracing::info!("Sleeping {}s {}", duration.as_secs(), reason);
		tokio::time::sleep(duration).await;
	}
	duration
}
