// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use strata_graph::{AuthorizationRequest, EntityGraphBuilder};
use tracing::{debug, info, instrument, warn};

use crate::error::AuthorizeError;
use crate::evaluator::{Decision, PolicyEvaluator};

/// Checks the fields the graph builder relies on being present.
pub fn validate_request(request: &AuthorizationRequest) -> Result<(), AuthorizeError> {
	let required = [
		("userId", &request.user_id),
		("action", &request.action),
		("resourceType", &request.resource_type),
		("resourceId", &request.resource_id),
	];
	for (field, value) in required {
		if value.trim().is_empty() {
			return Err(AuthorizeError::MissingField(field));
		}
	}
	Ok(())
}

/// Wires the entity graph builder to a policy evaluator.
pub struct Authorizer {
	builder: EntityGraphBuilder,
	evaluator: Arc<dyn PolicyEvaluator>,
}

impl Authorizer {
	pub fn new(builder: EntityGraphBuilder, evaluator: Arc<dyn PolicyEvaluator>) -> Self {
		Self { builder, evaluator }
	}

	pub fn builder(&self) -> &EntityGraphBuilder {
		&self.builder
	}

	#[instrument(
		level = "debug",
		skip(self, request),
		fields(user_id = %request.user_id, action = %request.action, resource = %request.resource_uid())
	)]
	pub async fn authorize(&self, request: &AuthorizationRequest) -> Result<Decision, AuthorizeError> {
		validate_request(request)?;

		let built = self.builder.build(request).await?;
		if !built.degraded.is_empty() {
			debug!(
				degraded = built.degraded.len(),
				"evaluating without part of the hierarchy"
			);
		}

		let decision = self.evaluator.decide(&built.request, &built.graph).await?;

		info!(
			allowed = decision.allowed,
			entity_count = built.graph.len(),
			"authorization decided"
		);
		Ok(decision)
	}

	/// Evaluates a batch against one merged entity graph.
	#[instrument(level = "debug", skip(self, requests), fields(requests = requests.len()))]
	pub async fn authorize_batch(
		&self,
		requests: &[AuthorizationRequest],
	) -> Result<Vec<Decision>, AuthorizeError> {
		if requests.is_empty() {
			return Ok(Vec::new());
		}
		for (index, request) in requests.iter().enumerate() {
			if let Err(e) = validate_request(request) {
				warn!(index, error = %e, "rejecting batch with invalid request");
				return Err(e);
			}
		}

		let batch = self.builder.build_batch(requests).await?;
		let decisions = self
			.evaluator
			.batch_decide(&batch.requests, &batch.graph)
			.await?;

		if decisions.len() != requests.len() {
			return Err(AuthorizeError::DecisionCountMismatch {
				expected: requests.len(),
				actual: decisions.len(),
			});
		}

		info!(
			requests = requests.len(),
			allowed = decisions.iter().filter(|d| d.allowed).count(),
			entity_count = batch.graph.len(),
			"batch authorization decided"
		);
		Ok(decisions)
	}
}
