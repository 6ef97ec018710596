// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Deduplicated entity sets.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strata_hierarchy::EntityUid;
use tracing::warn;

use crate::entity::Entity;
use crate::error::GraphError;

/// How [`EntityGraph::merge`] treats two definitions of one entity that set
/// the same attribute to different values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
	/// Fail the merge with [`GraphError::ConflictingEntity`].
	#[default]
	Reject,
	/// Keep the value already in the graph and log the discarded one.
	FirstWins,
}

impl MergePolicy {
	pub fn as_str(&self) -> &'static str {
		match self {
			MergePolicy::Reject => "reject",
			MergePolicy::FirstWins => "first_wins",
		}
	}
}

/// Ordered entity list, unique by `(entityType, entityId)`.
///
/// Serializes as a plain JSON array in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityGraph {
	entities: Vec<Entity>,
	index: HashMap<EntityUid, usize>,
}

impl EntityGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `entity` unless its identifier is already present.
	/// Returns true if the entity was added.
	pub fn insert(&mut self, entity: Entity) -> bool {
		if self.index.contains_key(&entity.identifier) {
			return false;
		}
		self
			.index
			.insert(entity.identifier.clone(), self.entities.len());
		self.entities.push(entity);
		true
	}

	pub fn contains(&self, uid: &EntityUid) -> bool {
		self.index.contains_key(uid)
	}

	pub fn get(&self, uid: &EntityUid) -> Option<&Entity> {
		self.index.get(uid).map(|&i| &self.entities[i])
	}

	pub fn len(&self) -> usize {
		self.entities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Entity> {
		self.entities.iter()
	}

	pub fn entities(&self) -> &[Entity] {
		&self.entities
	}

	pub fn into_entities(self) -> Vec<Entity> {
		self.entities
	}

	/// Merges `other` into this graph.
	///
	/// Two definitions of one entity are folded together with
	/// [`Entity::absorb`]: attributes and parent edges are unioned. They
	/// conflict only when both set the same attribute to different values.
	/// Under [`MergePolicy::Reject`] a conflict fails the merge and leaves this
	/// graph untouched; under [`MergePolicy::FirstWins`] the existing value is
	/// kept.
	pub fn merge(&mut self, other: EntityGraph, policy: MergePolicy) -> Result<(), GraphError> {
		if policy == MergePolicy::Reject {
			if let Some((uid, attribute)) = other.iter().find_map(|entity| {
				let existing = self.get(&entity.identifier)?;
				let attribute = existing.conflicting_attribute(entity)?;
				Some((entity.identifier.clone(), attribute.to_string()))
			}) {
				return Err(GraphError::ConflictingEntity { uid, attribute });
			}
		}

		for entity in other.entities {
			let Some(&i) = self.index.get(&entity.identifier) else {
				self.insert(entity);
				continue;
			};
			let existing = &mut self.entities[i];
			if let Some(attribute) = existing.conflicting_attribute(&entity) {
				warn!(
					entity = %entity.identifier,
					attribute,
					"conflicting entity definitions in batch; keeping the first value"
				);
			}
			existing.absorb(entity);
		}
		Ok(())
	}
}

impl FromIterator<Entity> for EntityGraph {
	fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
		let mut graph = EntityGraph::new();
		for entity in iter {
			graph.insert(entity);
		}
		graph
	}
}

impl Extend<Entity> for EntityGraph {
	fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
		for entity in iter {
			self.insert(entity);
		}
	}
}

impl<'a> IntoIterator for &'a EntityGraph {
	type Item = &'a Entity;
	type IntoIter = std::slice::Iter<'a, Entity>;

	fn into_iter(self) -> Self::IntoIter {
		self.entities.iter()
	}
}

impl Serialize for EntityGraph {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_seq(&self.entities)
	}
}

impl<'de> Deserialize<'de> for EntityGraph {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let entities = Vec::<Entity>::deserialize(deserializer)?;
		Ok(entities.into_iter().collect())
	}
}
