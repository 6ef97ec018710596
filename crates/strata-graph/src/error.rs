// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use strata_hierarchy::{EntityUid, HierarchyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
	/// A hierarchy failure that cannot be degraded around (corrupt containment data).
	#[error("hierarchy resolution failed: {0}")]
	Hierarchy(#[from] HierarchyError),

	#[error("conflicting values for attribute '{attribute}' on entity {uid}")]
	ConflictingEntity { uid: EntityUid, attribute: String },
}
