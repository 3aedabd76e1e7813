// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry logic with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Maximum number of attempts (including the first one).
	pub max_attempts: u32,
	/// Delay before the first retry.
	pub base_delay: Duration,
	/// Upper bound on any single delay.
	pub max_delay: Duration,
	/// Multiplier applied to the delay after each failed attempt.
	pub backoff_factor: f64,
	/// Randomize each delay to avoid thundering herds.
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(500),
			max_delay: Duration::from_secs(30),
			backoff_factor: 2.0,
			jitter: true,
		}
	}
}

/// Errors that can indicate whether a retry is worthwhile.
pub trait RetryableError {
	/// Returns true if the operation may succeed on a subsequent attempt.
	fn is_retryable(&self) -> bool;
}

/// Run `op` until it succeeds, fails with a non-retryable error, or
/// `config.max_attempts` is exhausted.
///
/// The final error is returned unchanged; intermediate failures are logged.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, E>
where
	E: RetryableError + std::fmt::Display,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut attempt = 1;
	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(e) if e.is_retryable() && attempt < config.max_attempts => {
				let delay = delay_for_attempt(config, attempt);
				warn!(
					attempt,
					max_attempts = config.max_attempts,
					delay_ms = delay.as_millis() as u64,
					error = %e,
					"transient failure, retrying"
				);
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
			Err(e) => return Err(e),
		}
	}
}

fn delay_for_attempt(config: &RetryConfig, attempt: u32) -> Duration {
	let exp = config.backoff_factor.powi(attempt.saturating_sub(1) as i32);
	let raw = config.base_delay.as_secs_f64() * exp;
	let capped = raw.min(config.max_delay.as_secs_f64());
	let jittered = if config.jitter {
		// Full jitter keeps the cap while spreading retries over [cap/2, cap].
		capped * (0.5 + fastrand::f64() * 0.5)
	} else {
		capped
	};
	Duration::from_secs_f64(jittered)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};

	#[derive(Debug)]
	struct TestError {
		retryable: bool,
	}

	impl std::fmt::Display for TestError {
		fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
			write!(f, "test error (retryable: {})", self.retryable)
		}
	}

	impl RetryableError for TestError {
		fn is_retryable(&self) -> bool {
			self.retryable
		}
	}

	fn fast_config() -> RetryConfig {
		RetryConfig {
			max_attempts: 3,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(5),
			backoff_factor: 2.0,
			jitter: false,
		}
	}

	#[tokio::test]
	async fn succeeds_first_attempt() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), || async {
			calls.fetch_add(1, Ordering::SeqCst);
			Ok(42)
		})
		.await;
		assert_eq!(result.unwrap(), 42);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn retries_transient_then_succeeds() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), || async {
			let n = calls.fetch_add(1, Ordering::SeqCst);
			if n < 2 {
				Err(TestError { retryable: true })
			} else {
				Ok(7)
			}
		})
		.await;
		assert_eq!(result.unwrap(), 7);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn non_retryable_fails_immediately() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), || async {
			calls.fetch_add(1, Ordering::SeqCst);
			Err(TestError { retryable: false })
		})
		.await;
		assert!(result.is_err());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn exhausts_max_attempts() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), || async {
			calls.fetch_add(1, Ordering::SeqCst);
			Err(TestError { retryable: true })
		})
		.await;
		assert!(result.is_err());
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn delay_respects_cap() {
		let config = RetryConfig {
			max_attempts: 10,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(4),
			backoff_factor: 2.0,
			jitter: false,
		};
		assert_eq!(delay_for_attempt(&config, 1), Duration::from_secs(1));
		assert_eq!(delay_for_attempt(&config, 2), Duration::from_secs(2));
		assert_eq!(delay_for_attempt(&config, 3), Duration::from_secs(4));
		assert_eq!(delay_for_attempt(&config, 8), Duration::from_secs(4));
	}
}
