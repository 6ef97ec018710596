// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hierarchy data source configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_HIERARCHY_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_HIERARCHY_MAX_RETRIES: u32 = 3;

/// Where hierarchy records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchySource {
	/// The in-memory store, loaded from `fixture_path` or the bundled dataset.
	#[default]
	Fixture,
	/// A remote hierarchy service at `remote_url`.
	Remote,
}

impl std::fmt::Display for HierarchySource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			HierarchySource::Fixture => write!(f, "fixture"),
			HierarchySource::Remote => write!(f, "remote"),
		}
	}
}

impl std::str::FromStr for HierarchySource {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"fixture" => Ok(HierarchySource::Fixture),
			"remote" => Ok(HierarchySource::Remote),
			_ => Err(ConfigError::InvalidValue {
				key: "hierarchy.source".to_string(),
				message: format!("unknown source '{s}', expected 'fixture' or 'remote'"),
			}),
		}
	}
}

/// Hierarchy configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyConfig {
	pub source: HierarchySource,
	/// JSON fixture to load; the bundled dataset is used when unset.
	pub fixture_path: Option<PathBuf>,
	pub remote_url: Option<String>,
	pub timeout_secs: u64,
	pub max_retries: u32,
}

impl Default for HierarchyConfig {
	fn default() -> Self {
		HierarchyConfigLayer::default().finalize()
	}
}

/// Hierarchy configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchyConfigLayer {
	#[serde(default)]
	pub source: Option<HierarchySource>,
	#[serde(default)]
	pub fixture_path: Option<PathBuf>,
	#[serde(default)]
	pub remote_url: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub max_retries: Option<u32>,
}

impl HierarchyConfigLayer {
	pub fn merge(&mut self, other: HierarchyConfigLayer) {
		if other.source.is_some() {
			self.source = other.source;
		}
		if other.fixture_path.is_some() {
			self.fixture_path = other.fixture_path;
		}
		if other.remote_url.is_some() {
			self.remote_url = other.remote_url;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
		if other.max_retries.is_some() {
			self.max_retries = other.max_retries;
		}
	}

	pub fn finalize(self) -> HierarchyConfig {
		HierarchyConfig {
			source: self.source.unwrap_or_default(),
			fixture_path: self.fixture_path,
			remote_url: self.remote_url.filter(|url| !url.trim().is_empty()),
			timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_HIERARCHY_TIMEOUT_SECS),
			max_retries: self.max_retries.unwrap_or(DEFAULT_HIERARCHY_MAX_RETRIES),
		}
	}
}
