// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client for the policy evaluator.
//!
//! - `POST {base}/decide` with `{principal, action, resource, entities}`,
//!   answered by one [`Decision`]
//! - `POST {base}/batch-decide` with `{requests, entities}`, answered by an
//!   array of decisions in request order

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use strata_common_http::RetryConfig;
use strata_graph::{DecisionRequest, EntityGraph};
use tracing::{debug, instrument};
use url::Url;

use crate::error::EvaluatorError;
use crate::evaluator::{Decision, PolicyEvaluator};

#[derive(Serialize)]
struct DecidePayload<'a> {
	#[serde(flatten)]
	request: &'a DecisionRequest,
	entities: &'a EntityGraph,
}

#[derive(Serialize)]
struct BatchDecidePayload<'a> {
	requests: &'a [DecisionRequest],
	entities: &'a EntityGraph,
}

pub struct HttpPolicyEvaluator {
	base_url: Url,
	http: reqwest::Client,
	retry_config: RetryConfig,
}

impl HttpPolicyEvaluator {
	pub fn new(mut base_url: Url, http: reqwest::Client) -> Self {
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());
			base_url.set_path(&path);
		}
		Self {
			base_url,
			http,
			retry_config: RetryConfig::default(),
		}
	}

	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	fn endpoint(&self, name: &str) -> Result<Url, EvaluatorError> {
		self
			.base_url
			.join(name)
			.map_err(|e| EvaluatorError::InvalidUrl(e.to_string()))
	}

	async fn post<B, R>(&self, name: &str, body: &B) -> Result<R, EvaluatorError>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		let url = self.endpoint(name)?;

		let response = strata_common_http::retry(&self.retry_config, || async {
			let response = match self.http.post(url.clone()).json(body).send().await {
				Ok(response) => response,
				Err(e) => return Err(EvaluatorError::Network(e)),
			};
			let status = response.status();
			if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
				let message = response.text().await.unwrap_or_default();
				return Err(EvaluatorError::Server { status, message });
			}
			Ok(response)
		})
		.await?;

		match response.status() {
			StatusCode::OK => response.json::<R>().await.map_err(EvaluatorError::Decode),
			status => Err(EvaluatorError::UnexpectedStatus(status)),
		}
	}
}

#[async_trait]
impl PolicyEvaluator for HttpPolicyEvaluator {
	#[instrument(level = "debug", skip(self, request, entities), fields(resource = %request.resource))]
	async fn decide(
		&self,
		request: &DecisionRequest,
		entities: &EntityGraph,
	) -> Result<Decision, EvaluatorError> {
		let decision: Decision = self
			.post("decide", &DecidePayload { request, entities })
			.await?;
		debug!(
			allowed = decision.allowed,
			policies = decision.determining_policies.len(),
			"received decision"
		);
		Ok(decision)
	}

	#[instrument(level = "debug", skip(self, requests, entities), fields(requests = requests.len()))]
	async fn batch_decide(
		&self,
		requests: &[DecisionRequest],
		entities: &EntityGraph,
	) -> Result<Vec<Decision>, EvaluatorError> {
		let decisions: Vec<Decision> = self
			.post("batch-decide", &BatchDecidePayload { requests, entities })
			.await?;
		debug!(decisions = decisions.len(), "received batch decisions");
		Ok(decisions)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use strata_graph::{Entity, EntityType, EntityUid};
	use wiremock::matchers::{body_partial_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn evaluator_for(server: &MockServer) -> HttpPolicyEvaluator {
		let base = Url::parse(&format!("{}/v1", server.uri())).unwrap();
		HttpPolicyEvaluator::new(base, reqwest::Client::new()).with_retry_config(RetryConfig {
			max_attempts: 2,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(2),
			jitter: false,
		})
	}

	fn decision_request() -> DecisionRequest {
		DecisionRequest {
			principal: EntityUid::new(EntityType::User, "u1"),
			action: EntityUid::new(EntityType::Action, "View"),
			resource: EntityUid::new("Project", "p1"),
		}
	}

	fn graph() -> EntityGraph {
		[Entity::new(EntityUid::new(EntityType::User, "u1"))]
			.into_iter()
			.collect()
	}

	#[tokio::test]
	async fn decide_posts_flat_payload() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/decide"))
			.and(body_partial_json(serde_json::json!({
				"principal": {"entityType": "User", "entityId": "u1"},
				"action": {"entityType": "Action", "entityId": "View"},
				"resource": {"entityType": "Project", "entityId": "p1"},
				"entities": [{"identifier": {"entityType": "User", "entityId": "u1"}}]
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"allowed": true,
				"determiningPolicies": ["viewer-access"]
			})))
			.expect(1)
			.mount(&server)
			.await;

		let decision = evaluator_for(&server)
			.decide(&decision_request(), &graph())
			.await
			.unwrap();
		assert!(decision.allowed);
		assert_eq!(decision.determining_policies, vec!["viewer-access"]);
		assert!(decision.errors.is_empty());
	}

	#[tokio::test]
	async fn batch_decide_returns_decisions_in_order() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/batch-decide"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
				{"allowed": true},
				{"allowed": false, "errors": ["no matching policy"]}
			])))
			.mount(&server)
			.await;

		let decisions = evaluator_for(&server)
			.batch_decide(&[decision_request(), decision_request()], &graph())
			.await
			.unwrap();
		assert_eq!(decisions.len(), 2);
		assert!(decisions[0].allowed);
		assert!(!decisions[1].allowed);
		assert_eq!(decisions[1].errors, vec!["no matching policy"]);
	}

	#[tokio::test]
	async fn server_errors_are_retried() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/decide"))
			.respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
			.expect(2)
			.mount(&server)
			.await;

		let err = evaluator_for(&server)
			.decide(&decision_request(), &graph())
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			EvaluatorError::Server {
				status: StatusCode::BAD_GATEWAY,
				..
			}
		));
	}

	#[tokio::test]
	async fn client_errors_are_not_retried() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/v1/decide"))
			.respond_with(ResponseTemplate::new(400))
			.expect(1)
			.mount(&server)
			.await;

		let err = evaluator_for(&server)
			.decide(&decision_request(), &graph())
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			EvaluatorError::UnexpectedStatus(StatusCode::BAD_REQUEST)
		));
	}

	#[test]
	fn base_url_gains_trailing_slash() {
		let evaluator = HttpPolicyEvaluator::new(
			Url::parse("http://evaluator.internal/api").unwrap(),
			reqwest::Client::new(),
		);
		assert_eq!(
			evaluator.endpoint("decide").unwrap().as_str(),
			"http://evaluator.internal/api/decide"
		);
	}
}
