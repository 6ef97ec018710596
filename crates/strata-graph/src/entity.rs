// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Wire-level entities handed to the policy evaluator.
//!
//! The JSON shape is:
//!
//! ```json
//! {
//!   "identifier": {"entityType": "Project", "entityId": "p1"},
//!   "attributes": {"createdBy": {"entityIdentifier": {"entityType": "User", "entityId": "u1"}}},
//!   "parents": [{"entityType": "Site", "entityId": "portland-manufacturing"}]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_hierarchy::{EntityUid, HierarchyNode};

/// Typed attribute value, externally tagged (`{"string": "viewer"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValue {
	String(String),
	Long(i64),
	Boolean(bool),
	EntityIdentifier(EntityUid),
	Set(Vec<AttributeValue>),
	Record(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
	pub fn as_entity(&self) -> Option<&EntityUid> {
		match self {
			AttributeValue::EntityIdentifier(uid) => Some(uid),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttributeValue::String(s) => Some(s),
			_ => None,
		}
	}
}

impl From<EntityUid> for AttributeValue {
	fn from(uid: EntityUid) -> Self {
		AttributeValue::EntityIdentifier(uid)
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		AttributeValue::String(value)
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		AttributeValue::String(value.to_string())
	}
}

impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		AttributeValue::Boolean(value)
	}
}

impl From<i64> for AttributeValue {
	fn from(value: i64) -> Self {
		AttributeValue::Long(value)
	}
}

/// One node of the entity graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
	pub identifier: EntityUid,
	#[serde(default)]
	pub attributes: BTreeMap<String, AttributeValue>,
	#[serde(default)]
	pub parents: Vec<EntityUid>,
}

impl Entity {
	pub fn new(identifier: EntityUid) -> Self {
		Self {
			identifier,
			attributes: BTreeMap::new(),
			parents: Vec::new(),
		}
	}

	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	pub fn with_parent(mut self, parent: EntityUid) -> Self {
		self.add_parent(parent);
		self
	}

	/// Appends a parent edge unless it is already present or points at the
	/// entity itself. Returns true if the edge was added.
	pub fn add_parent(&mut self, parent: EntityUid) -> bool {
		if parent == self.identifier || self.parents.contains(&parent) {
			return false;
		}
		self.parents.push(parent);
		true
	}

	pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
		self.attributes.get(name)
	}

	pub fn has_parent(&self, parent: &EntityUid) -> bool {
		self.parents.contains(parent)
	}

	/// First attribute both entities define with different values.
	pub fn conflicting_attribute(&self, other: &Entity) -> Option<&str> {
		self
			.attributes
			.iter()
			.find(|(name, value)| other.attributes.get(*name).is_some_and(|v| v != *value))
			.map(|(name, _)| name.as_str())
	}

	/// Folds another definition of this entity into it. Attributes missing
	/// here are added, existing values are kept, parent edges are unioned.
	pub fn absorb(&mut self, other: Entity) {
		for (name, value) in other.attributes {
			self.attributes.entry(name).or_insert(value);
		}
		for parent in other.parents {
			self.add_parent(parent);
		}
	}
}

impl From<&HierarchyNode> for Entity {
	fn from(node: &HierarchyNode) -> Self {
		let mut entity = Entity::new(node.uid.clone());
		for parent in &node.parents {
			entity.add_parent(parent.clone());
		}
		entity
	}
}
