// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory hierarchy store backed by fixture data.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::trace;

use crate::error::StoreError;
use crate::store::{
	ContainerRecord, HierarchyStore, ParticipationRecord, ProgramKind, ProgramRecord, SiteRecord,
};

/// Hierarchy store holding every record in memory.
///
/// Regions and organizations share one container namespace, matching the
/// `get_container` contract.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHierarchyStore {
	sites: HashMap<String, SiteRecord>,
	containers: HashMap<String, ContainerRecord>,
	program_nodes: HashMap<(ProgramKind, String), ProgramRecord>,
	participations: HashMap<String, ParticipationRecord>,
}

impl InMemoryHierarchyStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces a site. Returns the previous record, if any.
	pub fn insert_site(&mut self, site: SiteRecord) -> Option<SiteRecord> {
		self.sites.insert(site.id.clone(), site)
	}

	/// Inserts or replaces a region or organization.
	pub fn insert_container(&mut self, container: ContainerRecord) -> Option<ContainerRecord> {
		self.containers.insert(container.id.clone(), container)
	}

	pub fn insert_program_node(
		&mut self,
		kind: ProgramKind,
		record: ProgramRecord,
	) -> Option<ProgramRecord> {
		self.program_nodes.insert((kind, record.id.clone()), record)
	}

	pub fn insert_participation(
		&mut self,
		record: ParticipationRecord,
	) -> Option<ParticipationRecord> {
		self.participations.insert(record.id.clone(), record)
	}

	pub fn site_count(&self) -> usize {
		self.sites.len()
	}

	pub fn container_count(&self) -> usize {
		self.containers.len()
	}

	/// Ids of every stored site, sorted.
	pub fn site_ids(&self) -> Vec<&str> {
		let mut ids: Vec<&str> = self.sites.keys().map(String::as_str).collect();
		ids.sort_unstable();
		ids
	}
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
	async fn get_site(&self, id: &str) -> Result<Option<SiteRecord>, StoreError> {
		trace!(site_id = %id, "in-memory site lookup");
		Ok(self.sites.get(id).cloned())
	}

	async fn get_container(&self, id: &str) -> Result<Option<ContainerRecord>, StoreError> {
		trace!(container_id = %id, "in-memory container lookup");
		Ok(self.containers.get(id).cloned())
	}

	async fn get_program_node(
		&self,
		kind: ProgramKind,
		id: &str,
	) -> Result<Option<ProgramRecord>, StoreError> {
		trace!(kind = %kind, id = %id, "in-memory program lookup");
		Ok(self.program_nodes.get(&(kind, id.to_string())).cloned())
	}

	async fn get_participation(
		&self,
		id: &str,
	) -> Result<Option<ParticipationRecord>, StoreError> {
		trace!(participation_id = %id, "in-memory participation lookup");
		Ok(self.participations.get(id).cloned())
	}
}
