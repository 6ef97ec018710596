// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Fixture data for the in-memory store.
//!
//! [`cascade_energy`] is the bundled dataset. [`FixtureDocument`] is the JSON
//! shape accepted by [`InMemoryHierarchyStore::from_json_file`]:
//!
//! ```json
//! {
//!   "organizations": [{"id": "1", "name": "Cascade Energy"}],
//!   "regions": [{"id": "10", "name": "West Region", "parent": {"type": "organization", "id": "1"}}],
//!   "sites": [{"id": "portland-manufacturing", "name": "Portland Manufacturing",
//!              "container": {"type": "region", "id": "10"}}],
//!   "clients": [], "programs": [], "cohorts": [], "cycles": [], "participations": []
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FixtureError;
use crate::memory::InMemoryHierarchyStore;
use crate::store::{
	ContainerRecord, ContainerRef, ParticipationRecord, ProgramKind, ProgramRecord, SiteRecord,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureDocument {
	#[serde(default)]
	pub organizations: Vec<ContainerRecord>,
	#[serde(default)]
	pub regions: Vec<ContainerRecord>,
	#[serde(default)]
	pub sites: Vec<SiteRecord>,
	#[serde(default)]
	pub clients: Vec<ProgramRecord>,
	#[serde(default)]
	pub programs: Vec<ProgramRecord>,
	#[serde(default)]
	pub cohorts: Vec<ProgramRecord>,
	#[serde(default)]
	pub cycles: Vec<ProgramRecord>,
	#[serde(default)]
	pub participations: Vec<ParticipationRecord>,
}

impl FixtureDocument {
	/// Loads every record into a fresh store, rejecting duplicate ids.
	///
	/// Organizations and regions share the container namespace, so an id used
	/// by both is a duplicate.
	pub fn into_store(self) -> Result<InMemoryHierarchyStore, FixtureError> {
		let mut store = InMemoryHierarchyStore::new();

		let mut container_ids = HashSet::new();
		for container in self.organizations.into_iter().chain(self.regions) {
			if !container_ids.insert(container.id.clone()) {
				return Err(FixtureError::DuplicateId {
					kind: "container",
					id: container.id,
				});
			}
			store.insert_container(container);
		}

		for site in self.sites {
			if store.insert_site(site.clone()).is_some() {
				return Err(FixtureError::DuplicateId {
					kind: "site",
					id: site.id,
				});
			}
		}

		let program_sets = [
			(ProgramKind::Client, self.clients, "client"),
			(ProgramKind::Program, self.programs, "program"),
			(ProgramKind::Cohort, self.cohorts, "cohort"),
			(ProgramKind::Cycle, self.cycles, "cycle"),
		];
		for (kind, records, label) in program_sets {
			for record in records {
				if store.insert_program_node(kind, record.clone()).is_some() {
					return Err(FixtureError::DuplicateId {
						kind: label,
						id: record.id,
					});
				}
			}
		}

		for participation in self.participations {
			if store.insert_participation(participation.clone()).is_some() {
				return Err(FixtureError::DuplicateId {
					kind: "participation",
					id: participation.id,
				});
			}
		}

		Ok(store)
	}
}

impl InMemoryHierarchyStore {
	/// Reads a [`FixtureDocument`] from a JSON file.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| FixtureError::FileRead {
			path: path.to_path_buf(),
			source,
		})?;
		let document: FixtureDocument =
			serde_json::from_str(&content).map_err(|source| FixtureError::Parse {
				path: path.to_path_buf(),
				source,
			})?;
		let store = document.into_store()?;

		info!(
			path = %path.display(),
			sites = store.site_count(),
			containers = store.container_count(),
			"loaded hierarchy fixture"
		);

		Ok(store)
	}
}

fn org(id: &str, name: &str) -> ContainerRecord {
	ContainerRecord {
		id: id.to_string(),
		name: Some(name.to_string()),
		parent: None,
	}
}

fn region(id: &str, name: &str, org_id: &str) -> ContainerRecord {
	ContainerRecord {
		id: id.to_string(),
		name: Some(name.to_string()),
		parent: Some(ContainerRef::organization(org_id)),
	}
}

fn site(id: &str, name: &str, container: ContainerRef) -> SiteRecord {
	SiteRecord {
		id: id.to_string(),
		name: Some(name.to_string()),
		container,
	}
}

fn program_node(id: &str, name: &str, parent_id: Option<&str>) -> ProgramRecord {
	ProgramRecord {
		id: id.to_string(),
		name: Some(name.to_string()),
		parent_id: parent_id.map(str::to_string),
	}
}

fn participation(id: &str, cohort_id: &str, site_id: &str) -> ParticipationRecord {
	ParticipationRecord {
		id: id.to_string(),
		name: None,
		cohort_id: cohort_id.to_string(),
		site_id: Some(site_id.to_string()),
	}
}

/// The bundled dataset: two organizations with regional and direct sites,
/// plus two energy-efficiency programs that enroll some of those sites.
pub fn cascade_energy() -> InMemoryHierarchyStore {
	let mut store = InMemoryHierarchyStore::new();

	store.insert_container(org("1", "Cascade Energy"));
	store.insert_container(org("2", "Summit Utilities"));
	store.insert_container(region("10", "West Region", "1"));
	store.insert_container(region("11", "East Region", "1"));
	store.insert_container(region("20", "Mountain Region", "2"));

	store.insert_site(site(
		"portland-manufacturing",
		"Portland Manufacturing",
		ContainerRef::region("10"),
	));
	store.insert_site(site(
		"seattle-distribution",
		"Seattle Distribution Center",
		ContainerRef::region("10"),
	));
	store.insert_site(site("boston-office", "Boston Office", ContainerRef::region("11")));
	store.insert_site(site(
		"cascade-hq",
		"Cascade Headquarters",
		ContainerRef::organization("1"),
	));
	store.insert_site(site("denver-plant", "Denver Plant", ContainerRef::region("20")));
	store.insert_site(site(
		"boise-warehouse",
		"Boise Warehouse",
		ContainerRef::organization("2"),
	));

	store.insert_program_node(
		ProgramKind::Client,
		program_node("bpa", "Bonneville Power Administration", None),
	);
	store.insert_program_node(
		ProgramKind::Client,
		program_node("energy-trust", "Energy Trust of Oregon", None),
	);
	store.insert_program_node(
		ProgramKind::Program,
		program_node("sem-2024", "Strategic Energy Management 2024", Some("bpa")),
	);
	store.insert_program_node(
		ProgramKind::Program,
		program_node(
			"industrial-efficiency",
			"Industrial Efficiency",
			Some("energy-trust"),
		),
	);
	store.insert_program_node(
		ProgramKind::Cohort,
		program_node("sem-2024-cohort-a", "SEM 2024 Cohort A", Some("sem-2024")),
	);
	store.insert_program_node(
		ProgramKind::Cohort,
		program_node("ie-cohort-1", "IE Cohort 1", Some("industrial-efficiency")),
	);
	store.insert_program_node(
		ProgramKind::Cycle,
		program_node("sem-2024-a-cycle-1", "Cycle 1", Some("sem-2024-cohort-a")),
	);

	store.insert_participation(participation(
		"portland-sem-2024",
		"sem-2024-cohort-a",
		"portland-manufacturing",
	));
	store.insert_participation(participation(
		"seattle-sem-2024",
		"sem-2024-cohort-a",
		"seattle-distribution",
	));
	store.insert_participation(participation("denver-ie", "ie-cohort-1", "denver-plant"));

	store
}
