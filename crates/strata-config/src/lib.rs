// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for Strata.
//!
//! Layers are merged in precedence order:
//!
//! 1. Environment variables (`STRATA_*`)
//! 2. Config file (`/etc/strata/strata.toml`, or the path given to
//!    [`load_config_with_file`])
//! 3. Built-in defaults
//!
//! ```toml
//! [hierarchy]
//! source = "remote"
//! remote_url = "http://hierarchy.internal/v1"
//!
//! [evaluator]
//! url = "http://evaluator.internal"
//!
//! [batch]
//! merge_policy = "first_wins"
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::StrataConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrataConfig {
	pub hierarchy: HierarchyConfig,
	pub evaluator: EvaluatorConfig,
	pub roles: RolesConfig,
	pub batch: BatchConfig,
	pub logging: LoggingConfig,
}

/// Loads defaults, the system config file and the environment.
pub fn load_config() -> Result<StrataConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Loads configuration from the environment only.
pub fn load_config_from_env() -> Result<StrataConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(DefaultsSource), Box::new(EnvSource)];
	load_from_sources(sources)
}

/// Loads configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<StrataConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Merges `sources` lowest precedence first and resolves the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<StrataConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = StrataConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Resolves a merged layer and validates it.
pub fn finalize(layer: StrataConfigLayer) -> Result<StrataConfig, ConfigError> {
	let config = StrataConfig {
		hierarchy: layer.hierarchy.unwrap_or_default().finalize(),
		evaluator: layer.evaluator.unwrap_or_default().finalize(),
		roles: layer.roles.unwrap_or_default().finalize(),
		batch: layer.batch.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		hierarchy_source = %config.hierarchy.source,
		fixture_configured = config.hierarchy.fixture_path.is_some(),
		evaluator_configured = config.evaluator.url.is_some(),
		roles = config.roles.known.len(),
		merge_policy = %config.batch.merge_policy,
		log_format = %config.logging.format,
		"Strata configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &StrataConfig) -> Result<(), ConfigError> {
	if config.hierarchy.source == HierarchySource::Remote && config.hierarchy.remote_url.is_none() {
		return Err(ConfigError::Validation(
			"hierarchy.source = \"remote\" requires hierarchy.remote_url (STRATA_HIERARCHY_URL)"
				.to_string(),
		));
	}

	if config.roles.known.is_empty() {
		return Err(ConfigError::Validation(
			"roles.known must name at least one role".to_string(),
		));
	}

	if config.roles.known.iter().any(|r| r.trim().is_empty()) {
		return Err(ConfigError::Validation(
			"roles.known must not contain blank role names".to_string(),
		));
	}

	Ok(())
}
