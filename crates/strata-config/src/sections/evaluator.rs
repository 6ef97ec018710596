// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy evaluator endpoint configuration.

use serde::Deserialize;

pub const DEFAULT_EVALUATOR_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
	/// Base URL of the evaluation service. Only `authorize` needs it.
	pub url: Option<String>,
	pub timeout_secs: u64,
}

impl Default for EvaluatorConfig {
	fn default() -> Self {
		EvaluatorConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluatorConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl EvaluatorConfigLayer {
	pub fn merge(&mut self, other: EvaluatorConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> EvaluatorConfig {
		EvaluatorConfig {
			url: self.url.filter(|url| !url.trim().is_empty()),
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_EVALUATOR_TIMEOUT_SECS),
		}
	}
}
