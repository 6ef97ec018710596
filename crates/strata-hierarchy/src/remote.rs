// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Hierarchy store backed by a remote HTTP service.
//!
//! Records are fetched with `GET {base}/{collection}/{id}`:
//! `sites`, `containers`, `clients`, `programs`, `cohorts`, `cycles`,
//! `participations`. A 404 means the record does not exist.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use strata_common_http::RetryConfig;
use tracing::debug;
use url::Url;

use crate::error::StoreError;
use crate::store::{
	ContainerRecord, HierarchyStore, ParticipationRecord, ProgramKind, ProgramRecord, SiteRecord,
};

pub struct RemoteHierarchyStore {
	base_url: Url,
	http: reqwest::Client,
	retry_config: RetryConfig,
}

impl RemoteHierarchyStore {
	pub fn new(base_url: Url, http: reqwest::Client) -> Self {
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

	fn record_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
		let mut url = self.base_url.clone();
		url
			.path_segments_mut()
			.map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
			.pop_if_empty()
			.push(collection)
			.push(id);
		Ok(url)
	}

	async fn fetch<T: DeserializeOwned>(
		&self,
		collection: &str,
		id: &str,
	) -> Result<Option<T>, StoreError> {
		let url = self.record_url(collection, id)?;

		debug!(url = %url, collection, id, "fetching hierarchy record");

		let response = strata_common_http::retry(&self.retry_config, || async {
			let response = match self.http.get(url.clone()).send().await {
				Ok(response) => response,
				Err(e) => return Err(StoreError::Network(e)),
			};
			let status = response.status();
			if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
				let message = response.text().await.unwrap_or_default();
				return Err(StoreError::Server { status, message });
			}
			Ok(response)
		})
		.await?;

		match response.status() {
			StatusCode::OK => {
				let record = response.json::<T>().await.map_err(StoreError::Decode)?;
				Ok(Some(record))
			}
			StatusCode::NOT_FOUND => {
				debug!(collection, id, "hierarchy record not found");
				Ok(None)
			}
			status => Err(StoreError::UnexpectedStatus(status)),
		}
	}
}

#[async_trait]
impl HierarchyStore for RemoteHierarchyStore {
	async fn get_site(&self, id: &str) -> Result<Option<SiteRecord>, StoreError> {
		self.fetch("sites", id).await
	}

	async fn get_container(&self, id: &str) -> Result<Option<ContainerRecord>, StoreError> {
		self.fetch("containers", id).await
	}

	async fn get_program_node(
		&self,
		kind: ProgramKind,
		id: &str,
	) -> Result<Option<ProgramRecord>, StoreError> {
		self.fetch(kind.collection(), id).await
	}

	async fn get_participation(
		&self,
		id: &str,
	) -> Result<Option<ParticipationRecord>, StoreError> {
		self.fetch("participations", id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn store_for(server: &MockServer) -> RemoteHierarchyStore {
		let base = Url::parse(&format!("{}/v1/", server.uri())).unwrap();
		RemoteHierarchyStore::new(base, reqwest::Client::new()).with_retry_config(RetryConfig {
			max_attempts: 2,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(2),
			jitter: false,
		})
	}

	#[tokio::test]
	async fn fetches_site_record() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/sites/portland-manufacturing"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"id": "portland-manufacturing",
				"name": "Portland Manufacturing",
				"container": {"type": "region", "id": "10"}
			})))
			.mount(&server)
			.await;

		let store = store_for(&server);
		let site = store
			.get_site("portland-manufacturing")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(site.container.id, "10");
	}

	#[tokio::test]
	async fn not_found_maps_to_none() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/containers/99"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let store = store_for(&server);
		assert!(store.get_container("99").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn program_nodes_use_kind_collection() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/cohorts/c1"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"id": "c1",
				"parent_id": "p1"
			})))
			.mount(&server)
			.await;

		let store = store_for(&server);
		let cohort = store
			.get_program_node(ProgramKind::Cohort, "c1")
			.await
			.unwrap()
			.unwrap();
		assert_eq!(cohort.parent_id.as_deref(), Some("p1"));
	}

	#[tokio::test]
	async fn unavailable_service_is_retried_then_reported() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/sites/s1"))
			.respond_with(ResponseTemplate::new(503).set_body_string("down"))
			.expect(2)
			.mount(&server)
			.await;

		let store = store_for(&server);
		let err = store.get_site("s1").await.unwrap_err();
		assert!(matches!(
			err,
			StoreError::Server {
				status: StatusCode::SERVICE_UNAVAILABLE,
				..
			}
		));
	}

	#[tokio::test]
	async fn ids_are_path_escaped() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/sites/a%2Fb"))
			.respond_with(ResponseTemplate::new(404))
			.expect(1)
			.mount(&server)
			.await;

		let store = store_for(&server);
		assert!(store.get_site("a/b").await.unwrap().is_none());
	}

	#[test]
	fn non_base_urls_are_rejected() {
		let store = RemoteHierarchyStore::new(
			Url::parse("mailto:ops@example.com").unwrap(),
			reqwest::Client::new(),
		);
		assert!(matches!(
			store.record_url("sites", "s1"),
			Err(StoreError::InvalidUrl(_))
		));
	}
}
