// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Entity graph construction for delegated authorization.
//!
//! Given a minimal [`AuthorizationRequest`], the [`EntityGraphBuilder`]
//! reconstructs every entity an external policy evaluator needs to apply
//! hierarchical grants:
//!
//! - the principal (`User`), with one `Role` parent per claimed role
//! - the resource, with its `createdBy` attribute and parent edges
//! - every node of the resource's organizational and program chains
//! - one entity per known role ([`RoleSet`])
//!
//! Entities are unique by `(entityType, entityId)` within an [`EntityGraph`].
//! Batch builds merge per-request graphs under an explicit [`MergePolicy`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata_graph::{AuthorizationRequest, EntityGraphBuilder, RoleSet};
//! use strata_hierarchy::cascade_energy;
//!
//! let builder = EntityGraphBuilder::from_store(Arc::new(cascade_energy()), RoleSet::standard());
//! let request = AuthorizationRequest::new("u1", "View", "Project", "p1")
//!     .with_roles(["viewer"])
//!     .with_parent_site("portland-manufacturing");
//! let built = builder.build(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&built.graph)?);
//! ```

pub mod builder;
pub mod entity;
pub mod error;
pub mod graph;
pub mod request;
pub mod roles;

pub use builder::{BatchGraph, BuiltGraph, EntityGraphBuilder, ResolutionFailure};
pub use entity::{AttributeValue, Entity};
pub use error::GraphError;
pub use graph::{EntityGraph, MergePolicy};
pub use request::{AuthorizationRequest, DecisionRequest, ParentHint, ResourceParents};
pub use roles::RoleSet;

pub use strata_hierarchy::{EntityType, EntityUid};
