// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Builds entity graphs for single and batch authorization requests.
//!
//! Each request yields, in order: the principal, the resource, every node of
//! the resolved hierarchy chains, and one entity per known role. Hierarchy
//! anchors come from the request:
//!
//! - site: the resource itself if it is a Site, else `resourceParentSite`,
//!   else `resourceParents.site`
//! - program: the resource itself if it is a program-hierarchy kind, else the
//!   most specific of `participation`, `cohort`, `program`, `client`
//!
//! A Participation bridged to a Site pulls in that Site's chain when the
//! request has no site anchor of its own.
//!
//! Recoverable resolution failures (missing records, unreachable store) are
//! logged and recorded in `degraded`; the graph is still built from what is
//! known directly. Data-integrity failures abort the build.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use strata_hierarchy::{
	EntityType, EntityUid, HierarchyChain, HierarchyResolver, HierarchyStore, ProgramAnchor,
	StoreHierarchyResolver,
};
use tracing::{debug, instrument, warn};

use crate::entity::{AttributeValue, Entity};
use crate::error::GraphError;
use crate::graph::{EntityGraph, MergePolicy};
use crate::request::{AuthorizationRequest, DecisionRequest, ParentHint};
use crate::roles::RoleSet;

/// A hierarchy anchor that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionFailure {
	pub anchor: EntityUid,
	pub reason: String,
}

/// The graph for one request.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltGraph {
	pub request: DecisionRequest,
	pub graph: EntityGraph,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub degraded: Vec<ResolutionFailure>,
}

/// One merged graph shared by every request of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchGraph {
	pub requests: Vec<DecisionRequest>,
	pub graph: EntityGraph,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub degraded: Vec<ResolutionFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ResolutionKey {
	Site(String),
	Program(ProgramAnchor),
}

impl ResolutionKey {
	fn anchor(&self) -> EntityUid {
		match self {
			ResolutionKey::Site(id) => EntityUid::new(EntityType::Site, id),
			ResolutionKey::Program(anchor) => anchor.uid(),
		}
	}
}

type Outcome = Result<HierarchyChain, ResolutionFailure>;

/// Request-scoped memo: each distinct anchor is resolved once per build.
type Resolutions = HashMap<ResolutionKey, Outcome>;

/// Anchors derived from one request.
#[derive(Debug, Default)]
struct Plan {
	site: Option<ResolutionKey>,
	program: Option<ResolutionKey>,
	bridged_site: Option<ResolutionKey>,
}

impl Plan {
	fn for_request(request: &AuthorizationRequest) -> Self {
		let resource = request.resource_uid();

		let site = if resource.entity_type == EntityType::Site {
			Some(request.resource_id.clone())
		} else {
			request
				.parent_site()
				.or_else(|| request.hint(ParentHint::Site))
				.map(str::to_string)
		};

		let program = ProgramAnchor::from_uid(&resource).or_else(|| {
			[
				ParentHint::Participation,
				ParentHint::Cohort,
				ParentHint::Program,
				ParentHint::Client,
			]
			.into_iter()
			.find_map(|hint| {
				request
					.hint(hint)
					.and_then(|id| ProgramAnchor::from_uid(&hint.uid(id)))
			})
		});

		Self {
			site: site.map(ResolutionKey::Site),
			program: program.map(ResolutionKey::Program),
			bridged_site: None,
		}
	}

	fn keys(&self) -> impl Iterator<Item = &ResolutionKey> {
		[&self.site, &self.program, &self.bridged_site]
			.into_iter()
			.flatten()
	}

	/// Looks for a Participation → Site bridge in the resolved program chain.
	fn bridge(&mut self, resolutions: &Resolutions) {
		if self.site.is_some() {
			return;
		}
		let Some(Ok(chain)) = self.program.as_ref().and_then(|key| resolutions.get(key)) else {
			return;
		};
		self.bridged_site = chain
			.nodes
			.iter()
			.filter(|node| node.uid.entity_type == EntityType::Participation)
			.flat_map(|node| node.parents.iter())
			.find(|parent| parent.entity_type == EntityType::Site)
			.map(|site| ResolutionKey::Site(site.entity_id.clone()));
	}
}

/// Builds entity graphs from authorization requests.
#[derive(Clone)]
pub struct EntityGraphBuilder {
	resolver: Arc<dyn HierarchyResolver>,
	roles: RoleSet,
	merge_policy: MergePolicy,
}

impl EntityGraphBuilder {
	pub fn new(resolver: Arc<dyn HierarchyResolver>, roles: RoleSet) -> Self {
		Self {
			resolver,
			roles,
			merge_policy: MergePolicy::default(),
		}
	}

	/// Builder over the standard store-backed resolver.
	pub fn from_store(store: Arc<dyn HierarchyStore>, roles: RoleSet) -> Self {
		Self::new(Arc::new(StoreHierarchyResolver::new(store)), roles)
	}

	pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
		self.merge_policy = policy;
		self
	}

	pub fn roles(&self) -> &RoleSet {
		&self.roles
	}

	pub fn merge_policy(&self) -> MergePolicy {
		self.merge_policy
	}

	/// Builds the entity graph for one request.
	///
	/// The request is assumed to be well formed; see the authorizer for
	/// required-field validation.
	#[instrument(
		level = "debug",
		skip(self, request),
		fields(user_id = %request.user_id, resource = %request.resource_uid())
	)]
	pub async fn build(&self, request: &AuthorizationRequest) -> Result<BuiltGraph, GraphError> {
		let mut plans = vec![Plan::for_request(request)];
		let resolutions = self.resolve_plans(&mut plans).await?;

		let plan = &plans[0];
		let graph = self.assemble(request, plan, &resolutions);
		let degraded = collect_failures(&plans, &resolutions);

		debug!(
			entity_count = graph.len(),
			degraded = degraded.len(),
			"built entity graph"
		);

		Ok(BuiltGraph {
			request: request.decision_request(),
			graph,
			degraded,
		})
	}

	/// Builds one merged graph for a batch of requests.
	///
	/// Distinct anchors across the batch are resolved once, concurrently.
	/// Per-request graphs are merged in request order under the configured
	/// [`MergePolicy`].
	#[instrument(
		level = "debug",
		skip(self, requests),
		fields(requests = requests.len(), merge_policy = self.merge_policy.as_str())
	)]
	pub async fn build_batch(
		&self,
		requests: &[AuthorizationRequest],
	) -> Result<BatchGraph, GraphError> {
		let mut plans: Vec<Plan> = requests.iter().map(Plan::for_request).collect();
		let resolutions = self.resolve_plans(&mut plans).await?;

		let mut graph = EntityGraph::new();
		for (request, plan) in requests.iter().zip(&plans) {
			let request_graph = self.assemble(request, plan, &resolutions);
			graph.merge(request_graph, self.merge_policy)?;
		}
		let degraded = collect_failures(&plans, &resolutions);

		debug!(
			entity_count = graph.len(),
			anchors = resolutions.len(),
			degraded = degraded.len(),
			"built batch entity graph"
		);

		Ok(BatchGraph {
			requests: requests
				.iter()
				.map(AuthorizationRequest::decision_request)
				.collect(),
			graph,
			degraded,
		})
	}

	async fn resolve_plans(&self, plans: &mut [Plan]) -> Result<Resolutions, GraphError> {
		let mut resolutions = Resolutions::new();

		let direct: Vec<ResolutionKey> = plans.iter().flat_map(Plan::keys).cloned().collect();
		self.resolve_missing(direct, &mut resolutions).await?;

		for plan in plans.iter_mut() {
			plan.bridge(&resolutions);
		}
		let bridged: Vec<ResolutionKey> = plans
			.iter()
			.filter_map(|plan| plan.bridged_site.clone())
			.collect();
		self.resolve_missing(bridged, &mut resolutions).await?;

		Ok(resolutions)
	}

	async fn resolve_missing(
		&self,
		keys: Vec<ResolutionKey>,
		resolutions: &mut Resolutions,
	) -> Result<(), GraphError> {
		let mut pending: Vec<ResolutionKey> = Vec::new();
		for key in keys {
			if !resolutions.contains_key(&key) && !pending.contains(&key) {
				pending.push(key);
			}
		}
		if pending.is_empty() {
			return Ok(());
		}

		let outcomes = try_join_all(pending.into_iter().map(|key| self.resolve_one(key))).await?;
		resolutions.extend(outcomes);
		Ok(())
	}

	async fn resolve_one(&self, key: ResolutionKey) -> Result<(ResolutionKey, Outcome), GraphError> {
		let result = match &key {
			ResolutionKey::Site(id) => self.resolver.resolve_site(id).await,
			ResolutionKey::Program(anchor) => self.resolver.resolve_program(anchor).await,
		};

		match result {
			Ok(chain) => Ok((key, Ok(chain))),
			Err(e) if e.is_recoverable() => {
				let anchor = key.anchor();
				warn!(
					anchor = %anchor,
					error = %e,
					"hierarchy resolution failed, continuing without hierarchy"
				);
				let failure = ResolutionFailure {
					anchor,
					reason: e.to_string(),
				};
				Ok((key, Err(failure)))
			}
			Err(e) => Err(GraphError::Hierarchy(e)),
		}
	}

	fn assemble(
		&self,
		request: &AuthorizationRequest,
		plan: &Plan,
		resolutions: &Resolutions,
	) -> EntityGraph {
		let chains: Vec<&HierarchyChain> = plan
			.keys()
			.filter_map(|key| match resolutions.get(key) {
				Some(Ok(chain)) => Some(chain),
				_ => None,
			})
			.collect();

		let mut graph = EntityGraph::new();

		let mut principal = Entity::new(request.principal_uid());
		for role in request.user_roles.iter().filter(|r| !r.trim().is_empty()) {
			principal.add_parent(EntityUid::new(EntityType::Role, role));
		}
		graph.insert(principal);

		graph.insert(resource_entity(request, &chains));

		for chain in &chains {
			graph.extend(chain.nodes.iter().map(Entity::from));
		}

		graph.extend(self.roles.entities());
		graph
	}
}

fn resource_entity(request: &AuthorizationRequest, chains: &[&HierarchyChain]) -> Entity {
	let uid = request.resource_uid();
	let mut resource = Entity::new(uid.clone());

	if let Some(creator) = request.created_by() {
		resource = resource.with_attribute(
			"createdBy",
			AttributeValue::EntityIdentifier(EntityUid::new(EntityType::User, creator)),
		);
	}

	// A resource that is itself a hierarchy node takes its resolved parents.
	if let Some(node) = chains.iter().find_map(|chain| chain.node(&uid)) {
		for parent in &node.parents {
			resource.add_parent(parent.clone());
		}
	}

	if uid.entity_type != EntityType::Site {
		if let Some(site_id) = request.parent_site() {
			resource.add_parent(EntityUid::new(EntityType::Site, site_id));
		}
	}

	for (hint, id) in request.parent_hints() {
		resource.add_parent(hint.uid(id));
	}

	resource
}

fn collect_failures(plans: &[Plan], resolutions: &Resolutions) -> Vec<ResolutionFailure> {
	let mut failures: Vec<ResolutionFailure> = Vec::new();
	for key in plans.iter().flat_map(Plan::keys) {
		if let Some(Err(failure)) = resolutions.get(key) {
			if !failures.contains(failure) {
				failures.push(failure.clone());
			}
		}
	}
	failures
}

#[cfg(test)]
mod tests {
	use super::*;
	use strata_hierarchy::cascade_energy;

	fn builder() -> EntityGraphBuilder {
		EntityGraphBuilder::from_store(Arc::new(cascade_energy()), RoleSet::standard())
	}

	fn uid(entity_type: EntityType, id: &str) -> EntityUid {
		EntityUid::new(entity_type, id)
	}

	#[test]
	fn site_anchor_prefers_resource_then_legacy_hint() {
		let site = AuthorizationRequest::new("u1", "View", "Site", "s1").with_parent_site("s2");
		assert_eq!(
			Plan::for_request(&site).site,
			Some(ResolutionKey::Site("s1".into()))
		);

		let project = AuthorizationRequest::new("u1", "View", "Project", "p1")
			.with_parent_site("s2")
			.with_parents(crate::ResourceParents::default().with(ParentHint::Site, "s3"));
		assert_eq!(
			Plan::for_request(&project).site,
			Some(ResolutionKey::Site("s2".into()))
		);
	}

	#[test]
	fn program_anchor_picks_most_specific_hint() {
		let request = AuthorizationRequest::new("u1", "View", "Document", "d1").with_parents(
			crate::ResourceParents::default()
				.with(ParentHint::Client, "bpa")
				.with(ParentHint::Cohort, "c1"),
		);
		assert_eq!(
			Plan::for_request(&request).program,
			Some(ResolutionKey::Program(ProgramAnchor::Cohort("c1".into())))
		);

		let cycle = AuthorizationRequest::new("u1", "View", "Cycle", "cy1").with_parents(
			crate::ResourceParents::default().with(ParentHint::Cohort, "c1"),
		);
		assert_eq!(
			Plan::for_request(&cycle).program,
			Some(ResolutionKey::Program(ProgramAnchor::Cycle("cy1".into())))
		);
	}

	#[test]
	fn no_hints_means_no_anchor() {
		let plan = Plan::for_request(&AuthorizationRequest::new("u1", "View", "Project", "p1"));
		assert_eq!(plan.keys().count(), 0);
	}

	#[tokio::test]
	async fn site_resource_takes_chain_parents() {
		let request = AuthorizationRequest::new("u1", "Edit", "Site", "portland-manufacturing");
		let built = builder().build(&request).await.unwrap();

		let site = built
			.graph
			.get(&uid(EntityType::Site, "portland-manufacturing"))
			.unwrap();
		assert_eq!(site.parents, vec![uid(EntityType::Region, "10")]);
		assert!(built.graph.contains(&uid(EntityType::Organization, "1")));
		assert!(built.degraded.is_empty());
	}

	#[tokio::test]
	async fn participation_hint_bridges_both_hierarchies() {
		let request = AuthorizationRequest::new("u1", "View", "Report", "r1").with_parents(
			crate::ResourceParents::default().with(ParentHint::Participation, "portland-sem-2024"),
		);
		let built = builder().build(&request).await.unwrap();

		for expected in [
			uid(EntityType::Participation, "portland-sem-2024"),
			uid(EntityType::Cohort, "sem-2024-cohort-a"),
			uid(EntityType::Program, "sem-2024"),
			uid(EntityType::Client, "bpa"),
			uid(EntityType::Site, "portland-manufacturing"),
			uid(EntityType::Region, "10"),
			uid(EntityType::Organization, "1"),
		] {
			assert!(built.graph.contains(&expected), "missing {expected}");
		}

		let report = built.graph.get(&EntityUid::new("Report", "r1")).unwrap();
		assert_eq!(
			report.parents,
			vec![uid(EntityType::Participation, "portland-sem-2024")]
		);
	}

	#[tokio::test]
	async fn blank_roles_are_not_parents() {
		let request = AuthorizationRequest::new("u1", "View", "Project", "p1").with_roles(["viewer", " "]);
		let built = builder().build(&request).await.unwrap();
		let user = built.graph.get(&uid(EntityType::User, "u1")).unwrap();
		assert_eq!(user.parents, vec![uid(EntityType::Role, "viewer")]);
		assert!(user.attributes.is_empty());
	}

	#[tokio::test]
	async fn degraded_anchors_are_reported_once() {
		let requests = vec![
			AuthorizationRequest::new("u1", "View", "Project", "p1").with_parent_site("atlantis"),
			AuthorizationRequest::new("u1", "View", "Project", "p2").with_parent_site("atlantis"),
		];
		let batch = builder().build_batch(&requests).await.unwrap();
		assert_eq!(batch.degraded.len(), 1);
		assert_eq!(batch.degraded[0].anchor, uid(EntityType::Site, "atlantis"));
		assert_eq!(batch.requests.len(), 2);
	}
}
