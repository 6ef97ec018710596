// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Caller-supplied authorization requests.

use serde::{Deserialize, Serialize};
use strata_hierarchy::{EntityType, EntityUid};

/// "Can user U perform action A on resource R?"
///
/// Role claims are trusted input: they become parent edges on the principal
/// and are never checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
	pub user_id: String,
	#[serde(default)]
	pub user_roles: Vec<String>,
	pub action: String,
	pub resource_type: String,
	pub resource_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_created_by: Option<String>,
	/// Legacy single-parent hint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_parent_site: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_parents: Option<ResourceParents>,
}

impl AuthorizationRequest {
	pub fn new(
		user_id: impl Into<String>,
		action: impl Into<String>,
		resource_type: impl Into<String>,
		resource_id: impl Into<String>,
	) -> Self {
		Self {
			user_id: user_id.into(),
			user_roles: Vec::new(),
			action: action.into(),
			resource_type: resource_type.into(),
			resource_id: resource_id.into(),
			resource_created_by: None,
			resource_parent_site: None,
			resource_parents: None,
		}
	}

	pub fn with_roles<I, S>(mut self, roles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.user_roles = roles.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_created_by(mut self, user_id: impl Into<String>) -> Self {
		self.resource_created_by = Some(user_id.into());
		self
	}

	pub fn with_parent_site(mut self, site_id: impl Into<String>) -> Self {
		self.resource_parent_site = Some(site_id.into());
		self
	}

	pub fn with_parents(mut self, parents: ResourceParents) -> Self {
		self.resource_parents = Some(parents);
		self
	}

	pub fn principal_uid(&self) -> EntityUid {
		EntityUid::new(EntityType::User, &self.user_id)
	}

	pub fn action_uid(&self) -> EntityUid {
		EntityUid::new(EntityType::Action, &self.action)
	}

	pub fn resource_uid(&self) -> EntityUid {
		EntityUid::new(self.resource_type.as_str(), &self.resource_id)
	}

	pub fn created_by(&self) -> Option<&str> {
		non_blank(self.resource_created_by.as_deref())
	}

	pub fn parent_site(&self) -> Option<&str> {
		non_blank(self.resource_parent_site.as_deref())
	}

	/// Populated `resourceParents` entries in key order.
	pub fn parent_hints(&self) -> impl Iterator<Item = (ParentHint, &str)> {
		self.resource_parents.iter().flat_map(ResourceParents::iter)
	}

	pub fn hint(&self, hint: ParentHint) -> Option<&str> {
		self
			.resource_parents
			.as_ref()
			.and_then(|parents| parents.get(hint))
	}

	/// The principal/action/resource triple sent alongside the entity graph.
	pub fn decision_request(&self) -> DecisionRequest {
		DecisionRequest {
			principal: self.principal_uid(),
			action: self.action_uid(),
			resource: self.resource_uid(),
		}
	}
}

/// Named parent hints, from either hierarchy or both.
///
/// Keys outside this set (including `cycle`) are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceParents {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub site: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub organization: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub participation: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cohort: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub program: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client: Option<String>,
}

impl ResourceParents {
	pub fn get(&self, hint: ParentHint) -> Option<&str> {
		let value = match hint {
			ParentHint::Site => &self.site,
			ParentHint::Region => &self.region,
			ParentHint::Organization => &self.organization,
			ParentHint::Participation => &self.participation,
			ParentHint::Cohort => &self.cohort,
			ParentHint::Program => &self.program,
			ParentHint::Client => &self.client,
		};
		non_blank(value.as_deref())
	}

	pub fn set(&mut self, hint: ParentHint, id: impl Into<String>) {
		let slot = match hint {
			ParentHint::Site => &mut self.site,
			ParentHint::Region => &mut self.region,
			ParentHint::Organization => &mut self.organization,
			ParentHint::Participation => &mut self.participation,
			ParentHint::Cohort => &mut self.cohort,
			ParentHint::Program => &mut self.program,
			ParentHint::Client => &mut self.client,
		};
		*slot = Some(id.into());
	}

	pub fn with(mut self, hint: ParentHint, id: impl Into<String>) -> Self {
		self.set(hint, id);
		self
	}

	pub fn iter(&self) -> impl Iterator<Item = (ParentHint, &str)> {
		ParentHint::ALL
			.iter()
			.filter_map(move |&hint| self.get(hint).map(|id| (hint, id)))
	}
}

/// A recognised `resourceParents` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentHint {
	Site,
	Region,
	Organization,
	Participation,
	Cohort,
	Program,
	Client,
}

impl ParentHint {
	pub const ALL: [ParentHint; 7] = [
		ParentHint::Site,
		ParentHint::Region,
		ParentHint::Organization,
		ParentHint::Participation,
		ParentHint::Cohort,
		ParentHint::Program,
		ParentHint::Client,
	];

	pub fn entity_type(self) -> EntityType {
		match self {
			ParentHint::Site => EntityType::Site,
			ParentHint::Region => EntityType::Region,
			ParentHint::Organization => EntityType::Organization,
			ParentHint::Participation => EntityType::Participation,
			ParentHint::Cohort => EntityType::Cohort,
			ParentHint::Program => EntityType::Program,
			ParentHint::Client => EntityType::Client,
		}
	}

	pub fn key(self) -> &'static str {
		match self {
			ParentHint::Site => "site",
			ParentHint::Region => "region",
			ParentHint::Organization => "organization",
			ParentHint::Participation => "participation",
			ParentHint::Cohort => "cohort",
			ParentHint::Program => "program",
			ParentHint::Client => "client",
		}
	}

	pub fn uid(self, id: &str) -> EntityUid {
		EntityUid::new(self.entity_type(), id)
	}
}

/// Identifiers passed to the evaluator next to the graph, taken from the
/// request rather than the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionRequest {
	pub principal: EntityUid,
	pub action: EntityUid,
	pub resource: EntityUid,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_camel_case_request() {
		let request: AuthorizationRequest = serde_json::from_value(serde_json::json!({
			"userId": "u1",
			"userRoles": ["viewer"],
			"action": "View",
			"resourceType": "Project",
			"resourceId": "p1",
			"resourceCreatedBy": "u1",
			"resourceParentSite": "portland-manufacturing"
		}))
		.unwrap();

		assert_eq!(request.user_roles, vec!["viewer"]);
		assert_eq!(request.created_by(), Some("u1"));
		assert_eq!(request.parent_site(), Some("portland-manufacturing"));
		assert_eq!(request.resource_uid(), EntityUid::new("Project", "p1"));
	}

	#[test]
	fn unknown_parent_keys_are_dropped() {
		let request: AuthorizationRequest = serde_json::from_value(serde_json::json!({
			"userId": "u1",
			"action": "View",
			"resourceType": "Document",
			"resourceId": "d1",
			"resourceParents": {"cohort": "c1", "foo": "x", "cycle": "cy1"}
		}))
		.unwrap();

		let hints: Vec<_> = request.parent_hints().collect();
		assert_eq!(hints, vec![(ParentHint::Cohort, "c1")]);
		assert_eq!(
			ParentHint::Cohort.uid("c1"),
			EntityUid::new(EntityType::Cohort, "c1")
		);
	}

	#[test]
	fn blank_hints_count_as_absent() {
		let parents = ResourceParents::default()
			.with(ParentHint::Site, "  ")
			.with(ParentHint::Region, "10");
		assert_eq!(parents.get(ParentHint::Site), None);
		assert_eq!(parents.iter().collect::<Vec<_>>(), vec![(ParentHint::Region, "10")]);

		let request = AuthorizationRequest::new("u1", "View", "Project", "p1").with_parent_site("");
		assert_eq!(request.parent_site(), None);
	}

	#[test]
	fn hints_iterate_in_key_order() {
		let parents = ResourceParents::default()
			.with(ParentHint::Client, "bpa")
			.with(ParentHint::Site, "s1")
			.with(ParentHint::Cohort, "c1");
		let keys: Vec<_> = parents.iter().map(|(hint, _)| hint.key()).collect();
		assert_eq!(keys, vec!["site", "cohort", "client"]);
	}

	#[test]
	fn decision_request_uses_request_identifiers() {
		let decision = AuthorizationRequest::new("u1", "View", "Project", "p1").decision_request();
		assert_eq!(
			serde_json::to_value(&decision).unwrap(),
			serde_json::json!({
				"principal": {"entityType": "User", "entityId": "u1"},
				"action": {"entityType": "Action", "entityId": "View"},
				"resource": {"entityType": "Project", "entityId": "p1"}
			})
		);
	}
}
