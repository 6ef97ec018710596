// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batch graph merging.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What to do when two requests in a batch define one entity differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMergePolicy {
	#[default]
	Reject,
	FirstWins,
}

impl std::fmt::Display for BatchMergePolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BatchMergePolicy::Reject => write!(f, "reject"),
			BatchMergePolicy::FirstWins => write!(f, "first_wins"),
		}
	}
}

impl std::str::FromStr for BatchMergePolicy {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().replace('-', "_").as_str() {
			"reject" => Ok(BatchMergePolicy::Reject),
			"first_wins" => Ok(BatchMergePolicy::FirstWins),
			_ => Err(ConfigError::InvalidValue {
				key: "batch.merge_policy".to_string(),
				message: format!("unknown merge policy '{s}', expected 'reject' or 'first_wins'"),
			}),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchConfig {
	pub merge_policy: BatchMergePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfigLayer {
	#[serde(default)]
	pub merge_policy: Option<BatchMergePolicy>,
}

impl BatchConfigLayer {
	pub fn merge(&mut self, other: BatchConfigLayer) {
		if other.merge_policy.is_some() {
			self.merge_policy = other.merge_policy;
		}
	}

	pub fn finalize(self) -> BatchConfig {
		BatchConfig {
			merge_policy: self.merge_policy.unwrap_or_default(),
		}
	}
}
