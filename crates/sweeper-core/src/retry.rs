//! Bounded fixed-interval retries.
//!
//! Every network action goes through [`retry`]. Faults are logged and the
//! operation is attempted again after the policy's interval. Once attempts run
//! out the policy decides whether the last fault reaches the caller or the
//! caller gets "no result" and moves on.

use std::fmt::Display;
use std::future::Future;
use sweeper_types::RetryPolicy;

/// Runs `operation` until it succeeds or the policy's attempts are used up.
///
/// Returns `Ok(Some(value))` on success. On exhaustion returns the last error
/// when `policy.propagate_on_exhaustion` is set and `Ok(None)` otherwise.
pub async fn retry<T, E, F, Fut>(
	policy: &RetryPolicy,
	label: &str,
	mut operation: F,
) -> Result<Option<T>, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: Display,
{
	let max_attempts = policy.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match operation().await {
			Ok(value) => return Ok(Some(value)),
			Err(e) if attempt >= max_attempts => {
				tracing::error!(
					action = label,
					attempts = max_attempts,
					"Giving up: {}",
					e
				);
				return if policy.propagate_on_exhaustion {
					Err(e)
				} else {
					Ok(None)
				};
			},
			Err(e) => {
				tracing::warn!(
					action = label,
					attempt,
					max_attempts,
					"Attempt failed, retrying in {:?}: {}",
					policy.interval,
					e
				);
				tokio::time::sleep(policy.interval).await;
				attempt += 1;
			},
		}
	}
}
