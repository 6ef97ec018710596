// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The closed set of role names the system knows about.

use strata_hierarchy::{EntityType, EntityUid};

use crate::entity::{AttributeValue, Entity};

/// Ordered, duplicate-free set of known role names.
///
/// Passed explicitly to the builder so deployments and tests can substitute
/// their own role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet {
	roles: Vec<String>,
}

impl RoleSet {
	/// Roles known to a default deployment.
	pub const STANDARD: &'static [&'static str] = &[
		"global_admin",
		"org_admin",
		"region_admin",
		"site_admin",
		"program_admin",
		"editor",
		"viewer",
	];

	/// Builds a role set, dropping blank names and repeats while keeping order.
	pub fn new<I, S>(roles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut unique: Vec<String> = Vec::new();
		for role in roles {
			let role = role.into().trim().to_string();
			if !role.is_empty() && !unique.contains(&role) {
				unique.push(role);
			}
		}
		Self { roles: unique }
	}

	pub fn standard() -> Self {
		Self::new(Self::STANDARD.iter().copied())
	}

	pub fn contains(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r == role)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.roles.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.roles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.roles.is_empty()
	}

	/// One `Role` entity per known role, carrying its name as an attribute.
	pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
		self.roles.iter().map(|role| {
			Entity::new(EntityUid::new(EntityType::Role, role))
				.with_attribute("name", AttributeValue::String(role.clone()))
		})
	}
}

impl Default for RoleSet {
	fn default() -> Self {
		Self::standard()
	}
}
