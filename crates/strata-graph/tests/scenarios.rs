// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! End-to-end graph construction against the bundled Cascade Energy data.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use strata_graph::{
	AttributeValue, AuthorizationRequest, EntityGraph, EntityGraphBuilder, EntityType, EntityUid,
	GraphError, MergePolicy, ParentHint, ResourceParents, RoleSet,
};
use strata_hierarchy::{
	cascade_energy, HierarchyChain, HierarchyError, HierarchyResolver, ProgramAnchor,
	StoreError, StoreHierarchyResolver,
};

fn uid(entity_type: EntityType, id: &str) -> EntityUid {
	EntityUid::new(entity_type, id)
}

fn fixture_builder() -> EntityGraphBuilder {
	EntityGraphBuilder::from_store(Arc::new(cascade_energy()), RoleSet::standard())
}

fn assert_unique(graph: &EntityGraph) {
	let ids: Vec<&EntityUid> = graph.iter().map(|e| &e.identifier).collect();
	let unique: HashSet<&EntityUid> = ids.iter().copied().collect();
	assert_eq!(ids.len(), unique.len(), "duplicate entities in {ids:?}");
}

fn viewer_request() -> AuthorizationRequest {
	AuthorizationRequest::new("u1", "View", "Project", "p1")
		.with_roles(["viewer"])
		.with_created_by("u1")
		.with_parent_site("portland-manufacturing")
}

/// Fails every lookup with the error produced by `fail`, counting calls.
struct FailingResolver {
	calls: AtomicUsize,
	fail: fn() -> HierarchyError,
}

impl FailingResolver {
	fn new(fail: fn() -> HierarchyError) -> Self {
		Self {
			calls: AtomicUsize::new(0),
			fail,
		}
	}
}

#[async_trait]
impl HierarchyResolver for FailingResolver {
	async fn resolve_site(&self, _site_id: &str) -> Result<HierarchyChain, HierarchyError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Err((self.fail)())
	}

	async fn resolve_program(
		&self,
		_anchor: &ProgramAnchor,
	) -> Result<HierarchyChain, HierarchyError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Err((self.fail)())
	}
}

/// Delegates to the fixture resolver and counts site resolutions.
struct CountingResolver {
	inner: StoreHierarchyResolver,
	site_calls: AtomicUsize,
}

#[async_trait]
impl HierarchyResolver for CountingResolver {
	async fn resolve_site(&self, site_id: &str) -> Result<HierarchyChain, HierarchyError> {
		self.site_calls.fetch_add(1, Ordering::SeqCst);
		self.inner.resolve_site(site_id).await
	}

	async fn resolve_program(
		&self,
		anchor: &ProgramAnchor,
	) -> Result<HierarchyChain, HierarchyError> {
		self.inner.resolve_program(anchor).await
	}
}

#[tokio::test]
async fn viewer_request_produces_full_graph() {
	let built = fixture_builder().build(&viewer_request()).await.unwrap();
	let graph = &built.graph;

	let user = graph.get(&uid(EntityType::User, "u1")).unwrap();
	assert_eq!(user.parents, vec![uid(EntityType::Role, "viewer")]);

	let project = graph.get(&EntityUid::new("Project", "p1")).unwrap();
	assert_eq!(
		project.attribute("createdBy").and_then(AttributeValue::as_entity),
		Some(&uid(EntityType::User, "u1"))
	);
	assert_eq!(
		project.parents,
		vec![uid(EntityType::Site, "portland-manufacturing")]
	);

	let site = graph
		.get(&uid(EntityType::Site, "portland-manufacturing"))
		.unwrap();
	assert_eq!(site.parents, vec![uid(EntityType::Region, "10")]);
	let region = graph.get(&uid(EntityType::Region, "10")).unwrap();
	assert_eq!(region.parents, vec![uid(EntityType::Organization, "1")]);
	let org = graph.get(&uid(EntityType::Organization, "1")).unwrap();
	assert_eq!(org.parents, vec![EntityUid::system_root()]);

	for role in RoleSet::standard().iter() {
		let entity = graph.get(&uid(EntityType::Role, role)).unwrap();
		assert_eq!(
			entity.attribute("name").and_then(AttributeValue::as_str),
			Some(role)
		);
	}

	// principal + resource + three chain nodes + roles
	assert_eq!(graph.len(), 2 + 3 + RoleSet::STANDARD.len());
	assert_unique(graph);
	assert!(built.degraded.is_empty());

	assert_eq!(built.request.principal, uid(EntityType::User, "u1"));
	assert_eq!(built.request.action, uid(EntityType::Action, "View"));
	assert_eq!(built.request.resource, EntityUid::new("Project", "p1"));
}

#[tokio::test]
async fn graph_order_is_principal_resource_chain_roles() {
	let built = fixture_builder().build(&viewer_request()).await.unwrap();
	let order: Vec<EntityType> = built
		.graph
		.iter()
		.map(|e| e.identifier.entity_type.clone())
		.collect();

	assert_eq!(order[0], EntityType::User);
	assert_eq!(order[1], EntityType::Custom("Project".into()));
	assert_eq!(
		&order[2..5],
		&[EntityType::Site, EntityType::Region, EntityType::Organization]
	);
	assert!(order[5..].iter().all(|t| *t == EntityType::Role));
}

#[tokio::test]
async fn unknown_site_degrades_to_direct_entities() {
	let request = AuthorizationRequest::new("u1", "View", "Project", "p1")
		.with_roles(["viewer"])
		.with_parent_site("atlantis");
	let built = fixture_builder().build(&request).await.unwrap();

	assert!(built.graph.contains(&uid(EntityType::User, "u1")));
	let project = built.graph.get(&EntityUid::new("Project", "p1")).unwrap();
	assert_eq!(project.parents, vec![uid(EntityType::Site, "atlantis")]);
	assert!(!built.graph.contains(&uid(EntityType::Site, "atlantis")));
	assert_eq!(built.degraded.len(), 1);
	assert_eq!(built.degraded[0].anchor, uid(EntityType::Site, "atlantis"));
}

#[tokio::test]
async fn unreachable_store_degrades_like_not_found() {
	let resolver = Arc::new(FailingResolver::new(|| {
		HierarchyError::Store(StoreError::InvalidUrl("mailto:ops@example.com".into()))
	}));
	let builder = EntityGraphBuilder::new(resolver.clone(), RoleSet::new(["viewer"]));

	let built = builder.build(&viewer_request()).await.unwrap();
	assert_eq!(built.graph.len(), 3, "principal, resource and one role");
	assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_hierarchy_is_a_hard_failure() {
	let resolver = Arc::new(FailingResolver::new(|| HierarchyError::MalformedReference {
		entity: EntityUid::new(EntityType::Site, "portland-manufacturing"),
		tag: "county".into(),
	}));
	let builder = EntityGraphBuilder::new(resolver, RoleSet::standard());

	let err = builder.build(&viewer_request()).await.unwrap_err();
	assert!(matches!(
		err,
		GraphError::Hierarchy(HierarchyError::MalformedReference { .. })
	));
}

#[tokio::test]
async fn cohort_hint_becomes_parent_and_unknown_keys_drop() {
	let request: AuthorizationRequest = serde_json::from_value(serde_json::json!({
		"userId": "u1",
		"action": "View",
		"resourceType": "Document",
		"resourceId": "d1",
		"resourceParents": {"cohort": "sem-2024-cohort-a", "foo": "x"}
	}))
	.unwrap();
	let built = fixture_builder().build(&request).await.unwrap();

	let document = built.graph.get(&EntityUid::new("Document", "d1")).unwrap();
	assert_eq!(
		document.parents,
		vec![uid(EntityType::Cohort, "sem-2024-cohort-a")]
	);
	assert!(built.graph.contains(&uid(EntityType::Program, "sem-2024")));
	assert!(built.graph.contains(&uid(EntityType::Client, "bpa")));
	assert_unique(&built.graph);
}

#[tokio::test]
async fn site_hints_from_both_fields_do_not_duplicate_parents() {
	let request = AuthorizationRequest::new("u1", "View", "Project", "p1")
		.with_parent_site("portland-manufacturing")
		.with_parents(
			ResourceParents::default()
				.with(ParentHint::Site, "portland-manufacturing")
				.with(ParentHint::Region, "10"),
		);
	let built = fixture_builder().build(&request).await.unwrap();

	let project = built.graph.get(&EntityUid::new("Project", "p1")).unwrap();
	assert_eq!(
		project.parents,
		vec![
			uid(EntityType::Site, "portland-manufacturing"),
			uid(EntityType::Region, "10"),
		]
	);
	assert_unique(&built.graph);
}

#[tokio::test]
async fn batch_shares_region_between_sibling_sites() {
	let requests = vec![
		AuthorizationRequest::new("u1", "View", "Project", "p1")
			.with_roles(["viewer"])
			.with_parent_site("portland-manufacturing"),
		AuthorizationRequest::new("u2", "Edit", "Project", "p2")
			.with_roles(["editor"])
			.with_parent_site("seattle-distribution"),
	];
	let batch = fixture_builder().build_batch(&requests).await.unwrap();

	assert_unique(&batch.graph);
	let regions = batch
		.graph
		.iter()
		.filter(|e| e.identifier == uid(EntityType::Region, "10"))
		.count();
	assert_eq!(regions, 1);
	assert!(batch.graph.contains(&uid(EntityType::Site, "seattle-distribution")));
	assert_eq!(batch.requests.len(), 2);
	assert_eq!(batch.requests[1].principal, uid(EntityType::User, "u2"));
}

#[tokio::test]
async fn batch_on_one_site_resolves_it_once() {
	let resolver = Arc::new(CountingResolver {
		inner: StoreHierarchyResolver::new(Arc::new(cascade_energy())),
		site_calls: AtomicUsize::new(0),
	});
	let builder = EntityGraphBuilder::new(resolver.clone(), RoleSet::standard());
	let requests = vec![
		viewer_request(),
		AuthorizationRequest::new("u1", "View", "Project", "p2")
			.with_roles(["viewer"])
			.with_parent_site("portland-manufacturing"),
	];

	let batch = builder.build_batch(&requests).await.unwrap();

	assert_eq!(resolver.site_calls.load(Ordering::SeqCst), 1);
	assert_unique(&batch.graph);
	// u1, p1, p2, three chain nodes, roles
	assert_eq!(batch.graph.len(), 3 + 3 + RoleSet::STANDARD.len());
}

#[tokio::test]
async fn conflicting_batch_definitions_follow_merge_policy() {
	let requests = vec![
		viewer_request(),
		AuthorizationRequest::new("u1", "View", "Project", "p1")
			.with_roles(["viewer"])
			.with_created_by("u9")
			.with_parent_site("portland-manufacturing"),
	];

	let err = fixture_builder().build_batch(&requests).await.unwrap_err();
	assert!(
		matches!(err, GraphError::ConflictingEntity { ref uid, .. } if *uid == EntityUid::new("Project", "p1"))
	);

	let batch = fixture_builder()
		.with_merge_policy(MergePolicy::FirstWins)
		.build_batch(&requests)
		.await
		.unwrap();
	let project = batch.graph.get(&EntityUid::new("Project", "p1")).unwrap();
	assert_eq!(
		project.attribute("createdBy").and_then(AttributeValue::as_entity),
		Some(&uid(EntityType::User, "u1"))
	);
}

#[tokio::test]
async fn batch_touching_a_site_as_resource_and_as_parent_merges() {
	let site = uid(EntityType::Site, "portland-manufacturing");
	let requests = vec![
		AuthorizationRequest::new("u2", "Edit", "Site", "portland-manufacturing")
			.with_roles(["site_admin"])
			.with_created_by("u2")
			.with_parents(ResourceParents::default().with(ParentHint::Cohort, "sem-2024-cohort-a")),
		AuthorizationRequest::new("u1", "View", "Project", "p1")
			.with_roles(["viewer"])
			.with_parent_site("portland-manufacturing"),
	];

	let batch = fixture_builder().build_batch(&requests).await.unwrap();

	assert_unique(&batch.graph);
	let merged = batch.graph.get(&site).unwrap();
	assert_eq!(
		merged.attribute("createdBy").and_then(AttributeValue::as_entity),
		Some(&uid(EntityType::User, "u2"))
	);
	assert_eq!(
		merged.parents,
		vec![
			uid(EntityType::Region, "10"),
			uid(EntityType::Cohort, "sem-2024-cohort-a"),
		]
	);
	let project = batch.graph.get(&EntityUid::new("Project", "p1")).unwrap();
	assert_eq!(project.parents, vec![site]);
	assert!(batch.graph.contains(&uid(EntityType::Organization, "1")));
}

#[tokio::test]
async fn substitute_role_set_is_used() {
	let builder = EntityGraphBuilder::from_store(Arc::new(cascade_energy()), RoleSet::new(["auditor"]));
	let built = builder
		.build(&AuthorizationRequest::new("u1", "View", "Project", "p1"))
		.await
		.unwrap();

	let roles: Vec<&EntityUid> = built
		.graph
		.iter()
		.filter(|e| e.identifier.entity_type == EntityType::Role)
		.map(|e| &e.identifier)
		.collect();
	assert_eq!(roles, vec![&uid(EntityType::Role, "auditor")]);
}
