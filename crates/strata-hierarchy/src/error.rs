// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use reqwest::StatusCode;
use strata_common_http::RetryableError;
use thiserror::Error;

use crate::types::{EntityType, EntityUid};

/// Failures talking to a hierarchy data source.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("server error: {status} - {message}")]
	Server { status: StatusCode, message: String },

	#[error("unexpected status: {0}")]
	UnexpectedStatus(StatusCode),

	#[error("invalid URL: {0}")]
	InvalidUrl(String),

	#[error("failed to decode record: {0}")]
	Decode(#[source] reqwest::Error),
}

impl RetryableError for StoreError {
	fn is_retryable(&self) -> bool {
		match self {
			Self::Network(e) => e.is_retryable(),
			Self::Server { status, .. } => matches!(
				*status,
				StatusCode::TOO_MANY_REQUESTS
					| StatusCode::REQUEST_TIMEOUT
					| StatusCode::BAD_GATEWAY
					| StatusCode::SERVICE_UNAVAILABLE
					| StatusCode::GATEWAY_TIMEOUT
			),
			Self::UnexpectedStatus(_) | Self::InvalidUrl(_) | Self::Decode(_) => false,
		}
	}
}

/// Failures while resolving a containment chain.
#[derive(Debug, Error)]
pub enum HierarchyError {
	#[error("{entity_type} not found: {id}")]
	NotFound { entity_type: EntityType, id: String },

	#[error("malformed container reference on {entity}: unknown tag '{tag}'")]
	MalformedReference { entity: EntityUid, tag: String },

	#[error("{entity} has no parent container")]
	MissingParent { entity: EntityUid },

	#[error("{child} cannot be contained by {parent}")]
	InvalidContainment { child: EntityUid, parent: EntityUid },

	#[error("hierarchy store error: {0}")]
	Store(#[from] StoreError),
}

impl HierarchyError {
	pub fn not_found(entity_type: EntityType, id: impl Into<String>) -> Self {
		Self::NotFound {
			entity_type,
			id: id.into(),
		}
	}

	/// Missing records and unreachable data sources degrade the graph; corrupt
	/// containment data does not.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::NotFound { .. } | Self::Store(_))
	}
}

/// Failures loading a JSON hierarchy fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
	#[error("failed to read fixture {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse fixture {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("duplicate {kind} id in fixture: {id}")]
	DuplicateId { kind: &'static str, id: String },
}
