// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Hierarchy resolution: from a leaf id to its ordered ancestor chain.
//!
//! The organizational chain has a fixed depth:
//!
//! - `Site → Region → Organization` (three nodes)
//! - `Site → Organization` (two nodes)
//!
//! The program chain walks `Participation → Cohort → Program → Client` or
//! `Cycle → Cohort → Program → Client`, starting from whichever level the
//! anchor names. Both chains end with a node whose parent is `System:root`;
//! the root itself is never emitted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::HierarchyError;
use crate::store::{ContainerKind, ContainerRecord, HierarchyStore, ProgramKind, ProgramRecord};
use crate::types::{EntityType, EntityUid, HierarchyChain, HierarchyNode};

/// Starting point for a program-hierarchy resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgramAnchor {
	Participation(String),
	Cycle(String),
	Cohort(String),
	Program(String),
	Client(String),
}

impl ProgramAnchor {
	/// Maps an entity to an anchor when its type belongs to the program hierarchy.
	pub fn from_uid(uid: &EntityUid) -> Option<Self> {
		let id = uid.entity_id.clone();
		match uid.entity_type {
			EntityType::Participation => Some(ProgramAnchor::Participation(id)),
			EntityType::Cycle => Some(ProgramAnchor::Cycle(id)),
			EntityType::Cohort => Some(ProgramAnchor::Cohort(id)),
			EntityType::Program => Some(ProgramAnchor::Program(id)),
			EntityType::Client => Some(ProgramAnchor::Client(id)),
			_ => None,
		}
	}

	pub fn uid(&self) -> EntityUid {
		match self {
			ProgramAnchor::Participation(id) => EntityUid::new(EntityType::Participation, id),
			ProgramAnchor::Cycle(id) => EntityUid::new(EntityType::Cycle, id),
			ProgramAnchor::Cohort(id) => EntityUid::new(EntityType::Cohort, id),
			ProgramAnchor::Program(id) => EntityUid::new(EntityType::Program, id),
			ProgramAnchor::Client(id) => EntityUid::new(EntityType::Client, id),
		}
	}
}

/// Resolves leaf ids to their containment chains.
#[async_trait]
pub trait HierarchyResolver: Send + Sync {
	/// Resolves a Site to `[Site, Region, Organization]` or `[Site, Organization]`.
	async fn resolve_site(&self, site_id: &str) -> Result<HierarchyChain, HierarchyError>;

	/// Resolves a program-hierarchy node up to its Client.
	async fn resolve_program(&self, anchor: &ProgramAnchor)
		-> Result<HierarchyChain, HierarchyError>;
}

/// Resolver that reads records from any [`HierarchyStore`].
#[derive(Clone)]
pub struct StoreHierarchyResolver {
	store: Arc<dyn HierarchyStore>,
}

impl StoreHierarchyResolver {
	pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
		Self { store }
	}

	async fn container(
		&self,
		expected: EntityType,
		id: &str,
	) -> Result<ContainerRecord, HierarchyError> {
		self
			.store
			.get_container(id)
			.await?
			.ok_or_else(|| HierarchyError::not_found(expected, id))
	}

	async fn program_node(
		&self,
		kind: ProgramKind,
		id: &str,
	) -> Result<ProgramRecord, HierarchyError> {
		self
			.store
			.get_program_node(kind, id)
			.await?
			.ok_or_else(|| HierarchyError::not_found(kind.entity_type(), id))
	}
}

#[async_trait]
impl HierarchyResolver for StoreHierarchyResolver {
	#[instrument(level = "debug", skip(self))]
	async fn resolve_site(&self, site_id: &str) -> Result<HierarchyChain, HierarchyError> {
		let site = self
			.store
			.get_site(site_id)
			.await?
			.ok_or_else(|| HierarchyError::not_found(EntityType::Site, site_id))?;
		let site_uid = EntityUid::new(EntityType::Site, &site.id);

		let container_kind =
			site
				.container
				.container_kind()
				.ok_or_else(|| HierarchyError::MalformedReference {
					entity: site_uid.clone(),
					tag: site.container.kind.clone(),
				})?;

		let nodes = match container_kind {
			ContainerKind::Region => {
				let region = self
					.container(EntityType::Region, &site.container.id)
					.await?;
				let region_uid = EntityUid::new(EntityType::Region, &region.id);

				let org_ref = region
					.parent
					.as_ref()
					.ok_or_else(|| HierarchyError::MissingParent {
						entity: region_uid.clone(),
					})?;
				match org_ref.container_kind() {
					Some(ContainerKind::Organization) => {}
					Some(other) => {
						return Err(HierarchyError::InvalidContainment {
							child: region_uid,
							parent: EntityUid::new(other.entity_type(), &org_ref.id),
						});
					}
					None => {
						return Err(HierarchyError::MalformedReference {
							entity: region_uid,
							tag: org_ref.kind.clone(),
						});
					}
				}

				let org = self
					.container(EntityType::Organization, &org_ref.id)
					.await?;
				let org_uid = EntityUid::new(EntityType::Organization, &org.id);

				vec![
					HierarchyNode::new(site_uid, site.name, vec![region_uid.clone()]),
					HierarchyNode::new(region_uid, region.name, vec![org_uid.clone()]),
					HierarchyNode::new(org_uid, org.name, vec![EntityUid::system_root()]),
				]
			}
			ContainerKind::Organization => {
				let org = self
					.container(EntityType::Organization, &site.container.id)
					.await?;
				// Only regions carry a parent container.
				if org.parent.is_some() {
					return Err(HierarchyError::InvalidContainment {
						child: site_uid,
						parent: EntityUid::new(EntityType::Region, &org.id),
					});
				}
				let org_uid = EntityUid::new(EntityType::Organization, &org.id);

				vec![
					HierarchyNode::new(site_uid, site.name, vec![org_uid.clone()]),
					HierarchyNode::new(org_uid, org.name, vec![EntityUid::system_root()]),
				]
			}
		};

		let chain = HierarchyChain::from_nodes(nodes);
		debug!(site_id, depth = chain.len(), path = %chain.path, "resolved site hierarchy");
		Ok(chain)
	}

	#[instrument(level = "debug", skip(self))]
	async fn resolve_program(
		&self,
		anchor: &ProgramAnchor,
	) -> Result<HierarchyChain, HierarchyError> {
		let mut nodes = Vec::new();

		let mut next = match anchor {
			ProgramAnchor::Participation(id) => {
				let participation = self
					.store
					.get_participation(id)
					.await?
					.ok_or_else(|| HierarchyError::not_found(EntityType::Participation, id))?;

				let mut parents = vec![EntityUid::new(
					EntityType::Cohort,
					&participation.cohort_id,
				)];
				if let Some(site_id) = &participation.site_id {
					parents.push(EntityUid::new(EntityType::Site, site_id));
				}
				nodes.push(HierarchyNode::new(
					EntityUid::new(EntityType::Participation, &participation.id),
					participation.name,
					parents,
				));
				Some((ProgramKind::Cohort, participation.cohort_id))
			}
			ProgramAnchor::Cycle(id) => Some((ProgramKind::Cycle, id.clone())),
			ProgramAnchor::Cohort(id) => Some((ProgramKind::Cohort, id.clone())),
			ProgramAnchor::Program(id) => Some((ProgramKind::Program, id.clone())),
			ProgramAnchor::Client(id) => Some((ProgramKind::Client, id.clone())),
		};

		// Depth is bounded by the ProgramKind parent chain (Cycle → Client).
		while let Some((kind, id)) = next.take() {
			let record = self.program_node(kind, &id).await?;
			let uid = EntityUid::new(kind.entity_type(), &record.id);

			let parent = match kind.parent_kind() {
				Some(parent_kind) => {
					let parent_id = record
						.parent_id
						.clone()
						.ok_or_else(|| HierarchyError::MissingParent { entity: uid.clone() })?;
					next = Some((parent_kind, parent_id.clone()));
					EntityUid::new(parent_kind.entity_type(), parent_id)
				}
				None => EntityUid::system_root(),
			};

			nodes.push(HierarchyNode::new(uid, record.name, vec![parent]));
		}

		let chain = HierarchyChain::from_nodes(nodes);
		debug!(anchor = %anchor.uid(), depth = chain.len(), path = %chain.path, "resolved program hierarchy");
		Ok(chain)
	}
}
