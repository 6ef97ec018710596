// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a new HTTP client with the standard Strata User-Agent header.
pub fn new_client() -> reqwest::Result<Client> {
	builder().build()
}

/// Creates a new HTTP client builder with the standard Strata User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = strata_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client with a custom timeout and the standard User-Agent.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

/// Returns the standard Strata User-Agent string.
///
/// Format: `strata/{platform}/{version}`
pub fn user_agent() -> String {
	format!(
		"strata/{}-{}/{}",
		std::env::consts::OS,
		std::env::consts::ARCH,
		env!("CARGO_PKG_VERSION")
	)
}
