// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_graph::{DecisionRequest, EntityGraph};

use crate::error::EvaluatorError;

/// The evaluator's verdict, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
	pub allowed: bool,
	#[serde(default)]
	pub determining_policies: Vec<String>,
	#[serde(default)]
	pub errors: Vec<String>,
}

impl Decision {
	pub fn allow() -> Self {
		Self {
			allowed: true,
			determining_policies: Vec::new(),
			errors: Vec::new(),
		}
	}

	pub fn deny() -> Self {
		Self {
			allowed: false,
			determining_policies: Vec::new(),
			errors: Vec::new(),
		}
	}
}

/// External policy-evaluation service.
#[async_trait]
pub trait PolicyEvaluator: Send + Sync {
	async fn decide(
		&self,
		request: &DecisionRequest,
		entities: &EntityGraph,
	) -> Result<Decision, EvaluatorError>;

	/// Evaluates every request against one shared entity graph. Decisions are
	/// returned in request order.
	async fn batch_decide(
		&self,
		requests: &[DecisionRequest],
		entities: &EntityGraph,
	) -> Result<Vec<Decision>, EvaluatorError>;
}
