// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod batch;
mod evaluator;
mod hierarchy;
mod logging;
mod roles;

pub use batch::{BatchConfig, BatchConfigLayer, BatchMergePolicy};
pub use evaluator::{EvaluatorConfig, EvaluatorConfigLayer};
pub use hierarchy::{HierarchyConfig, HierarchyConfigLayer, HierarchySource};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use roles::{RolesConfig, RolesConfigLayer, DEFAULT_ROLES};
