// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Known role names.

use serde::Deserialize;

pub const DEFAULT_ROLES: &[&str] = &[
	"global_admin",
	"org_admin",
	"region_admin",
	"site_admin",
	"program_admin",
	"editor",
	"viewer",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolesConfig {
	pub known: Vec<String>,
}

impl Default for RolesConfig {
	fn default() -> Self {
		RolesConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolesConfigLayer {
	#[serde(default)]
	pub known: Option<Vec<String>>,
}

impl RolesConfigLayer {
	pub fn merge(&mut self, other: RolesConfigLayer) {
		if other.known.is_some() {
			self.known = other.known;
		}
	}

	pub fn finalize(self) -> RolesConfig {
		RolesConfig {
			known: self
				.known
				.unwrap_or_else(|| DEFAULT_ROLES.iter().map(|r| r.to_string()).collect()),
		}
	}
}
