// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{
	BatchConfigLayer, EvaluatorConfigLayer, HierarchyConfigLayer, LoggingConfigLayer,
	RolesConfigLayer,
};

/// One source's view of the configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrataConfigLayer {
	#[serde(default)]
	pub hierarchy: Option<HierarchyConfigLayer>,
	#[serde(default)]
	pub evaluator: Option<EvaluatorConfigLayer>,
	#[serde(default)]
	pub roles: Option<RolesConfigLayer>,
	#[serde(default)]
	pub batch: Option<BatchConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

fn merge_section<T>(target: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	match target {
		Some(existing) => merge(existing, other),
		None => *target = Some(other),
	}
}

impl StrataConfigLayer {
	/// Overlays `other` on top of this layer; fields set in `other` win.
	pub fn merge(&mut self, other: StrataConfigLayer) {
		merge_section(&mut self.hierarchy, other.hierarchy, HierarchyConfigLayer::merge);
		merge_section(&mut self.evaluator, other.evaluator, EvaluatorConfigLayer::merge);
		merge_section(&mut self.roles, other.roles, RolesConfigLayer::merge);
		merge_section(&mut self.batch, other.batch, BatchConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}
