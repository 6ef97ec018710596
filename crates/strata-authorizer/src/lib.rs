// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Authorization gateway for Strata.
//!
//! The [`Authorizer`] validates an [`AuthorizationRequest`], asks the
//! [`EntityGraphBuilder`] for its entity graph and hands the graph to a
//! [`PolicyEvaluator`]. Decisions are returned unchanged.
//!
//! [`AuthorizationRequest`]: strata_graph::AuthorizationRequest
//! [`EntityGraphBuilder`]: strata_graph::EntityGraphBuilder

mod authorizer;
mod error;
mod evaluator;
mod http;

pub use authorizer::{validate_request, Authorizer};
pub use error::{AuthorizeError, EvaluatorError};
pub use evaluator::{Decision, PolicyEvaluator};
pub use http::HttpPolicyEvaluator;
