// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

impl std::fmt::Display for LogFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			LogFormat::Pretty => write!(f, "pretty"),
			LogFormat::Json => write!(f, "json"),
		}
	}
}

impl std::str::FromStr for LogFormat {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"pretty" | "text" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			_ => Err(ConfigError::InvalidValue {
				key: "logging.format".to_string(),
				message: format!("unknown log format '{s}', expected 'pretty' or 'json'"),
			}),
		}
	}
}

/// Logging configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
	/// `EnvFilter` directive used when `RUST_LOG` is unset.
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::default(),
		}
	}
}

/// Logging configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| "info".to_string()),
			format: self.format.unwrap_or_default(),
		}
	}
}
