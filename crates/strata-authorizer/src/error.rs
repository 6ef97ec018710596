// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::StatusCode;
use strata_common_http::RetryableError;
use strata_graph::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvaluatorError {
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("server error: {status} - {message}")]
	Server { status: StatusCode, message: String },

	#[error("unexpected status: {0}")]
	UnexpectedStatus(StatusCode),

	#[error("invalid URL: {0}")]
	InvalidUrl(String),

	#[error("failed to decode evaluator response: {0}")]
	Decode(#[source] reqwest::Error),
}

impl RetryableError for EvaluatorError {
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

#[derive(Debug, Error)]
pub enum AuthorizeError {
	#[error("missing required field: {0}")]
	MissingField(&'static str),

	#[error("failed to build entity graph: {0}")]
	Graph(#[from] GraphError),

	#[error("policy evaluator failed: {0}")]
	Evaluator(#[from] EvaluatorError),

	#[error("evaluator returned {actual} decisions for {expected} requests")]
	DecisionCountMismatch { expected: usize, actual: usize },
}
