// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::StrataConfigLayer;
use crate::sections::{
	BatchConfigLayer, EvaluatorConfigLayer, HierarchyConfigLayer, LoggingConfigLayer,
	RolesConfigLayer,
};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/strata/strata.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<StrataConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<StrataConfigLayer, ConfigError> {
		Ok(StrataConfigLayer::default())
	}
}

/// TOML file source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<StrataConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(StrataConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: StrataConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: STRATA_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<StrataConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(StrataConfigLayer {
			hierarchy: Some(load_hierarchy_from_env()?),
			evaluator: Some(load_evaluator_from_env()?),
			roles: Some(load_roles_from_env()),
			batch: Some(load_batch_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
	T: FromStr,
{
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid value '{v}'"),
		}),
		None => Ok(None),
	}
}

/// Parses an enum setting, reporting the variable name on failure.
fn env_enum<T>(name: &str) -> Result<Option<T>, ConfigError>
where
	T: FromStr<Err = ConfigError>,
{
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|e| match e {
			ConfigError::InvalidValue { message, .. } => ConfigError::InvalidValue {
				key: name.to_string(),
				message,
			},
			other => other,
		}),
		None => Ok(None),
	}
}

fn split_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect()
}

fn load_hierarchy_from_env() -> Result<HierarchyConfigLayer, ConfigError> {
	Ok(HierarchyConfigLayer {
		source: env_enum("STRATA_HIERARCHY_SOURCE")?,
		fixture_path: env_var("STRATA_HIERARCHY_FIXTURE_PATH").map(PathBuf::from),
		remote_url: env_var("STRATA_HIERARCHY_URL"),
		timeout_secs: env_parse("STRATA_HIERARCHY_TIMEOUT_SECS")?,
		max_retries: env_parse("STRATA_HIERARCHY_MAX_RETRIES")?,
	})
}

fn load_evaluator_from_env() -> Result<EvaluatorConfigLayer, ConfigError> {
	Ok(EvaluatorConfigLayer {
		url: env_var("STRATA_EVALUATOR_URL"),
		timeout_secs: env_parse("STRATA_EVALUATOR_TIMEOUT_SECS")?,
	})
}

fn load_roles_from_env() -> RolesConfigLayer {
	RolesConfigLayer {
		known: env_var("STRATA_ROLES").map(|v| split_list(&v)),
	}
}

fn load_batch_from_env() -> Result<BatchConfigLayer, ConfigError> {
	Ok(BatchConfigLayer {
		merge_policy: env_enum("STRATA_BATCH_MERGE_POLICY")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("STRATA_LOG_LEVEL"),
		format: env_enum("STRATA_LOG_FORMAT")?,
	})
}
