// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Turns resolved configuration into running components.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use strata_authorizer::{Authorizer, HttpPolicyEvaluator};
use strata_common_http::RetryConfig;
use strata_config::{BatchMergePolicy, HierarchySource, LogFormat, StrataConfig};
use strata_graph::{EntityGraphBuilder, MergePolicy, RoleSet};
use strata_hierarchy::{
	cascade_energy, HierarchyStore, InMemoryHierarchyStore, RemoteHierarchyStore,
	StoreHierarchyResolver,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Installs the global subscriber. Logs go to stderr; stdout carries results.
pub fn init_tracing(config: &StrataConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());

	let (pretty, json) = match config.logging.format {
		LogFormat::Pretty => (
			Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
			None,
		),
		LogFormat::Json => (
			None,
			Some(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			),
		),
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(pretty)
		.with(json)
		.init();
}

pub fn merge_policy(setting: BatchMergePolicy) -> MergePolicy {
	match setting {
		BatchMergePolicy::Reject => MergePolicy::Reject,
		BatchMergePolicy::FirstWins => MergePolicy::FirstWins,
	}
}

pub fn hierarchy_store(config: &StrataConfig) -> Result<Arc<dyn HierarchyStore>> {
	let hierarchy = &config.hierarchy;
	match hierarchy.source {
		HierarchySource::Fixture => match &hierarchy.fixture_path {
			Some(path) => {
				let store = InMemoryHierarchyStore::from_json_file(path)
					.with_context(|| format!("loading hierarchy fixture {}", path.display()))?;
				Ok(Arc::new(store))
			}
			None => {
				info!("using bundled Cascade Energy hierarchy fixture");
				Ok(Arc::new(cascade_energy()))
			}
		},
		HierarchySource::Remote => {
			let Some(raw_url) = &hierarchy.remote_url else {
				bail!("hierarchy.remote_url is required for the remote hierarchy source");
			};
			let base_url =
				Url::parse(raw_url).with_context(|| format!("invalid hierarchy URL '{raw_url}'"))?;
			let http =
				strata_common_http::new_client_with_timeout(Duration::from_secs(hierarchy.timeout_secs))
					.context("building hierarchy HTTP client")?;

			info!(url = %base_url, "using remote hierarchy store");
			Ok(Arc::new(
				RemoteHierarchyStore::new(base_url, http)
					.with_retry_config(RetryConfig::with_max_retries(hierarchy.max_retries)),
			))
		}
	}
}

pub fn graph_builder(config: &StrataConfig) -> Result<EntityGraphBuilder> {
	let store = hierarchy_store(config)?;
	let resolver = Arc::new(StoreHierarchyResolver::new(store));
	let roles = RoleSet::new(config.roles.known.iter().cloned());
	Ok(EntityGraphBuilder::new(resolver, roles).with_merge_policy(merge_policy(config.batch.merge_policy)))
}

pub fn authorizer(config: &StrataConfig) -> Result<Authorizer> {
	let Some(raw_url) = &config.evaluator.url else {
		bail!("evaluator.url (STRATA_EVALUATOR_URL) is required to authorize");
	};
	let base_url =
		Url::parse(raw_url).with_context(|| format!("invalid evaluator URL '{raw_url}'"))?;
	let http = strata_common_http::new_client_with_timeout(Duration::from_secs(
		config.evaluator.timeout_secs,
	))
	.context("building evaluator HTTP client")?;

	let evaluator = Arc::new(HttpPolicyEvaluator::new(base_url, http));
	Ok(Authorizer::new(graph_builder(config)?, evaluator))
}

#[cfg(test)]
mod tests {
	use super::*;
	use strata_config::DEFAULT_ROLES;

	#[test]
	fn merge_policy_settings_map_one_to_one() {
		assert_eq!(merge_policy(BatchMergePolicy::Reject), MergePolicy::Reject);
		assert_eq!(merge_policy(BatchMergePolicy::FirstWins), MergePolicy::FirstWins);
	}

	#[test]
	fn default_config_uses_bundled_fixture() {
		let builder = graph_builder(&StrataConfig::default()).unwrap();
		assert_eq!(builder.roles().len(), DEFAULT_ROLES.len());
		assert_eq!(builder.merge_policy(), MergePolicy::Reject);
	}

	#[test]
	fn authorize_requires_evaluator_url() {
		let err = authorizer(&StrataConfig::default()).err().unwrap();
		assert!(err.to_string().contains("evaluator.url"));
	}

	#[test]
	fn missing_fixture_file_is_reported() {
		let mut config = StrataConfig::default();
		config.hierarchy.fixture_path = Some("/nonexistent/hierarchy.json".into());
		let err = hierarchy_store(&config).err().unwrap();
		assert!(format!("{err:#}").contains("/nonexistent/hierarchy.json"));
	}
}
