// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Containment hierarchies for Strata.
//!
//! Two parallel hierarchies share a single root sentinel (`System:root`):
//!
//! ```text
//! Organization ─▶ Region ─▶ Site
//! Organization ───────────▶ Site
//! Client ─▶ Program ─▶ Cohort ─▶ Cycle
//!                         ▲
//!                         └── Participation ──▶ Site
//! ```
//!
//! - [`HierarchyStore`]: read-only lookup of raw containment records, with an
//!   in-memory fixture implementation ([`InMemoryHierarchyStore`]) and a remote
//!   HTTP implementation ([`RemoteHierarchyStore`])
//! - [`HierarchyResolver`]: walks a leaf upward and returns an ordered
//!   [`HierarchyChain`]
//!
//! Resolution is recomputed on every call. Nothing here caches across requests.

pub mod error;
pub mod fixture;
pub mod memory;
pub mod remote;
pub mod resolver;
pub mod store;
pub mod types;

pub use error::{FixtureError, HierarchyError, StoreError};
pub use fixture::{cascade_energy, FixtureDocument};
pub use memory::InMemoryHierarchyStore;
pub use remote::RemoteHierarchyStore;
pub use resolver::{HierarchyResolver, ProgramAnchor, StoreHierarchyResolver};
pub use store::{
	ContainerKind, ContainerRecord, ContainerRef, HierarchyStore, ParticipationRecord, ProgramKind,
	ProgramRecord, SiteRecord,
};
pub use types::{EntityType, EntityUid, HierarchyChain, HierarchyNode, PATH_SEPARATOR};
