// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Raw containment records and the lookup contract over them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StoreError;
use crate::types::EntityType;

/// Tagged reference from a record to its container.
///
/// The tag is kept as stored so a corrupt tag surfaces as a resolution error
/// instead of failing deserialization of the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
	#[serde(rename = "type")]
	pub kind: String,
	pub id: String,
}

impl ContainerRef {
	pub fn organization(id: impl Into<String>) -> Self {
		Self {
			kind: "organization".to_string(),
			id: id.into(),
		}
	}

	pub fn region(id: impl Into<String>) -> Self {
		Self {
			kind: "region".to_string(),
			id: id.into(),
		}
	}

	pub fn container_kind(&self) -> Option<ContainerKind> {
		ContainerKind::parse(&self.kind)
	}
}

/// The two kinds of organizational container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
	Organization,
	Region,
}

impl ContainerKind {
	pub fn parse(tag: &str) -> Option<Self> {
		if tag.eq_ignore_ascii_case("organization") {
			Some(ContainerKind::Organization)
		} else if tag.eq_ignore_ascii_case("region") {
			Some(ContainerKind::Region)
		} else {
			None
		}
	}

	pub fn entity_type(self) -> EntityType {
		match self {
			ContainerKind::Organization => EntityType::Organization,
			ContainerKind::Region => EntityType::Region,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
	pub id: String,
	#[serde(default)]
	pub name: Option<String>,
	pub container: ContainerRef,
}

/// A Region or Organization. Organizations have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
	pub id: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub parent: Option<ContainerRef>,
}

/// Levels of the program hierarchy that share one record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
	Client,
	Program,
	Cohort,
	Cycle,
}

impl ProgramKind {
	pub fn entity_type(self) -> EntityType {
		match self {
			ProgramKind::Client => EntityType::Client,
			ProgramKind::Program => EntityType::Program,
			ProgramKind::Cohort => EntityType::Cohort,
			ProgramKind::Cycle => EntityType::Cycle,
		}
	}

	/// Kind of the required parent; `None` for top-level clients.
	pub fn parent_kind(self) -> Option<ProgramKind> {
		match self {
			ProgramKind::Client => None,
			ProgramKind::Program => Some(ProgramKind::Client),
			ProgramKind::Cohort => Some(ProgramKind::Program),
			ProgramKind::Cycle => Some(ProgramKind::Cohort),
		}
	}

	/// Plural collection name used by remote endpoints.
	pub fn collection(self) -> &'static str {
		match self {
			ProgramKind::Client => "clients",
			ProgramKind::Program => "programs",
			ProgramKind::Cohort => "cohorts",
			ProgramKind::Cycle => "cycles",
		}
	}
}

impl fmt::Display for ProgramKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.entity_type().as_str())
	}
}

/// Client, Program, Cohort or Cycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRecord {
	pub id: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub parent_id: Option<String>,
}

/// Enrollment of a site in a cohort; bridges the two hierarchies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
	pub id: String,
	#[serde(default)]
	pub name: Option<String>,
	pub cohort_id: String,
	#[serde(default)]
	pub site_id: Option<String>,
}

/// Read-only lookup of containment records by id.
///
/// `Ok(None)` means the record does not exist; `Err` means the source could
/// not answer.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
	async fn get_site(&self, id: &str) -> Result<Option<SiteRecord>, StoreError>;

	async fn get_container(&self, id: &str) -> Result<Option<ContainerRecord>, StoreError>;

	async fn get_program_node(
		&self,
		kind: ProgramKind,
		id: &str,
	) -> Result<Option<ProgramRecord>, StoreError>;

	async fn get_participation(&self, id: &str)
		-> Result<Option<ParticipationRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn container_tags_parse_case_insensitively() {
		assert_eq!(
			ContainerKind::parse("organization"),
			Some(ContainerKind::Organization)
		);
		assert_eq!(ContainerKind::parse("Region"), Some(ContainerKind::Region));
		assert_eq!(ContainerKind::parse("county"), None);
		assert_eq!(ContainerKind::parse(""), None);
	}

	#[test]
	fn container_ref_uses_type_key() {
		let json = serde_json::to_value(ContainerRef::region("10")).unwrap();
		assert_eq!(json, serde_json::json!({"type": "region", "id": "10"}));
	}

	#[test]
	fn program_kind_parents() {
		assert_eq!(ProgramKind::Cycle.parent_kind(), Some(ProgramKind::Cohort));
		assert_eq!(ProgramKind::Cohort.parent_kind(), Some(ProgramKind::Program));
		assert_eq!(ProgramKind::Program.parent_kind(), Some(ProgramKind::Client));
		assert_eq!(ProgramKind::Client.parent_kind(), None);
	}

	#[test]
	fn records_tolerate_missing_optional_fields() {
		let site: SiteRecord =
			serde_json::from_str(r#"{"id": "s1", "container": {"type": "organization", "id": "1"}}"#)
				.unwrap();
		assert!(site.name.is_none());
		assert_eq!(site.container.container_kind(), Some(ContainerKind::Organization));

		let org: ContainerRecord = serde_json::from_str(r#"{"id": "1", "name": "Org"}"#).unwrap();
		assert!(org.parent.is_none());
	}
}
