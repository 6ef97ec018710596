// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff and jitter for transient HTTP failures.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

/// Classifies errors as transient (worth retrying) or permanent.
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		self.status().map(is_retryable_status).unwrap_or(false)
	}
}

fn is_retryable_status(status: StatusCode) -> bool {
	matches!(
		status,
		StatusCode::TOO_MANY_REQUESTS
			| StatusCode::REQUEST_TIMEOUT
			| StatusCode::BAD_GATEWAY
			| StatusCode::SERVICE_UNAVAILABLE
			| StatusCode::GATEWAY_TIMEOUT
	)
}

/// Backoff parameters for [`retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total attempts including the first one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	/// Adds up to 50% random jitter to each delay.
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(5),
			jitter: true,
		}
	}
}

impl RetryConfig {
	/// Builds a config that retries `max_retries` times after the first attempt.
	pub fn with_max_retries(max_retries: u32) -> Self {
		Self {
			max_attempts: max_retries.saturating_add(1),
			..Self::default()
		}
	}

	fn delay_for(&self, attempt: u32) -> Duration {
		let exp = self
			.base_delay
			.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
		let capped = exp.min(self.max_delay);
		if self.jitter {
			let extra = capped.mul_f64(fastrand::f64() * 0.5);
			(capped + extra).min(self.max_delay)
		} else {
			capped
		}
	}
}

/// Runs `op` until it succeeds, returns a non-retryable error, or the attempt
/// budget is exhausted.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, E>
where
	E: RetryableError + std::fmt::Display,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let max_attempts = config.max_attempts.max(1);
	let mut attempt = 1;

	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if attempt < max_attempts && err.is_retryable() => {
				let delay = config.delay_for(attempt);
				warn!(
					attempt,
					max_attempts,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"transient failure, retrying"
				);
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
			Err(err) => {
				debug!(attempt, error = %err, "giving up");
				return Err(err);
			}
		}
	}
}
