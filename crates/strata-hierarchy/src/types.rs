// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Core type definitions shared by the hierarchy and the entity graph.
//!
//! - [`EntityType`]: closed set of entity kinds the evaluator understands, plus
//!   an open variant for caller-defined resource types
//! - [`EntityUid`]: the `(entityType, entityId)` pair that identifies an entity
//! - [`HierarchyNode`] / [`HierarchyChain`]: resolved containment data

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used in human-readable hierarchy paths.
pub const PATH_SEPARATOR: &str = " → ";

// =============================================================================
// Entity types
// =============================================================================

/// Kind of an entity in the authorization graph.
///
/// Serializes as its canonical name (`"Site"`, `"Region"`, ...). Parsing a
/// canonical name always yields the named variant, so `Custom` never holds one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
	User,
	Role,
	Action,
	System,
	Organization,
	Region,
	Site,
	Client,
	Program,
	Cohort,
	Cycle,
	Participation,
	/// A caller-defined resource type such as `Project`.
	Custom(String),
}

impl EntityType {
	/// Parses a type name, mapping canonical names to their variants.
	pub fn new(name: impl AsRef<str>) -> Self {
		match name.as_ref() {
			"User" => EntityType::User,
			"Role" => EntityType::Role,
			"Action" => EntityType::Action,
			"System" => EntityType::System,
			"Organization" => EntityType::Organization,
			"Region" => EntityType::Region,
			"Site" => EntityType::Site,
			"Client" => EntityType::Client,
			"Program" => EntityType::Program,
			"Cohort" => EntityType::Cohort,
			"Cycle" => EntityType::Cycle,
			"Participation" => EntityType::Participation,
			other => EntityType::Custom(other.to_string()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			EntityType::User => "User",
			EntityType::Role => "Role",
			EntityType::Action => "Action",
			EntityType::System => "System",
			EntityType::Organization => "Organization",
			EntityType::Region => "Region",
			EntityType::Site => "Site",
			EntityType::Client => "Client",
			EntityType::Program => "Program",
			EntityType::Cohort => "Cohort",
			EntityType::Cycle => "Cycle",
			EntityType::Participation => "Participation",
			EntityType::Custom(name) => name,
		}
	}

	/// Returns true for kinds that belong to the program hierarchy.
	pub fn is_program_kind(&self) -> bool {
		matches!(
			self,
			EntityType::Client
				| EntityType::Program
				| EntityType::Cohort
				| EntityType::Cycle
				| EntityType::Participation
		)
	}
}

impl fmt::Display for EntityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<String> for EntityType {
	fn from(name: String) -> Self {
		EntityType::new(name)
	}
}

impl From<&str> for EntityType {
	fn from(name: &str) -> Self {
		EntityType::new(name)
	}
}

impl From<EntityType> for String {
	fn from(entity_type: EntityType) -> Self {
		match entity_type {
			EntityType::Custom(name) => name,
			other => other.as_str().to_string(),
		}
	}
}

// =============================================================================
// Entity identifiers
// =============================================================================

/// Identifies one entity: `(entityType, entityId)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUid {
	pub entity_type: EntityType,
	pub entity_id: String,
}

impl EntityUid {
	pub fn new(entity_type: impl Into<EntityType>, entity_id: impl Into<String>) -> Self {
		Self {
			entity_type: entity_type.into(),
			entity_id: entity_id.into(),
		}
	}

	/// The sentinel every hierarchy terminates at.
	pub fn system_root() -> Self {
		Self::new(EntityType::System, "root")
	}

	pub fn is_system_root(&self) -> bool {
		self.entity_type == EntityType::System && self.entity_id == "root"
	}
}

impl fmt::Display for EntityUid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.entity_type, self.entity_id)
	}
}

// =============================================================================
// Resolved hierarchy
// =============================================================================

/// One node of a resolved containment chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
	pub uid: EntityUid,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Immediate containers, in stored order.
	pub parents: Vec<EntityUid>,
}

impl HierarchyNode {
	pub fn new(uid: EntityUid, name: Option<String>, parents: Vec<EntityUid>) -> Self {
		Self { uid, name, parents }
	}

	/// Display label, falling back to the id when no name is stored.
	pub fn label(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.uid.entity_id)
	}
}

/// Ordered ancestor chain, leaf first, ending just below `System:root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyChain {
	pub nodes: Vec<HierarchyNode>,
	/// Root-first display path, e.g. `Cascade Energy → West Region → Portland Manufacturing`.
	pub path: String,
}

impl HierarchyChain {
	/// Builds a chain from leaf-first nodes; the path is rendered root-first.
	pub fn from_nodes(nodes: Vec<HierarchyNode>) -> Self {
		let path = nodes
			.iter()
			.rev()
			.map(HierarchyNode::label)
			.collect::<Vec<_>>()
			.join(PATH_SEPARATOR);
		Self { nodes, path }
	}

	/// The node the chain was resolved from.
	pub fn leaf(&self) -> Option<&HierarchyNode> {
		self.nodes.first()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Finds the node for `uid`, if it is part of this chain.
	pub fn node(&self, uid: &EntityUid) -> Option<&HierarchyNode> {
		self.nodes.iter().find(|n| &n.uid == uid)
	}
}
