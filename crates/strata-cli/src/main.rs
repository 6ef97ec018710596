// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Strata command-line interface.
//!
//! Every command prints JSON to stdout. Logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use strata_graph::AuthorizationRequest;
use strata_hierarchy::{HierarchyResolver, ProgramAnchor, StoreHierarchyResolver};

mod version;
mod wiring;

/// Strata - entity graphs for delegated hierarchical authorization.
#[derive(Parser, Debug)]
#[command(
	name = "strata",
	about = "Hierarchy resolution and entity graph construction for delegated ABAC",
	version
)]
struct Args {
	/// Config file (defaults to /etc/strata/strata.toml)
	#[arg(long, global = true, env = "STRATA_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Resolve a Site to its organizational chain
	Resolve {
		site_id: String,
	},
	/// Resolve a program-hierarchy node up to its Client
	ResolveProgram {
		#[arg(value_enum)]
		kind: AnchorKind,
		id: String,
	},
	/// Build the entity graph for one request (JSON file, `-` for stdin)
	Graph {
		request: PathBuf,
	},
	/// Build one merged entity graph for a JSON array of requests
	Batch {
		requests: PathBuf,
	},
	/// Build the graph and ask the policy evaluator for a decision.
	/// An array of requests is evaluated as one batch.
	Authorize {
		request: PathBuf,
	},
	/// Show version and build information
	Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnchorKind {
	Participation,
	Cycle,
	Cohort,
	Program,
	Client,
}

impl AnchorKind {
	fn anchor(self, id: String) -> ProgramAnchor {
		match self {
			AnchorKind::Participation => ProgramAnchor::Participation(id),
			AnchorKind::Cycle => ProgramAnchor::Cycle(id),
			AnchorKind::Cohort => ProgramAnchor::Cohort(id),
			AnchorKind::Program => ProgramAnchor::Program(id),
			AnchorKind::Client => ProgramAnchor::Client(id),
		}
	}
}

/// Accepts a single request object or an array of them.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum RequestInput {
	Batch(Vec<AuthorizationRequest>),
	Single(Box<AuthorizationRequest>),
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => strata_config::load_config_with_file(path),
		None => strata_config::load_config(),
	}
	.context("loading configuration")?;

	wiring::init_tracing(&config);

	match args.command {
		Command::Resolve { site_id } => {
			let resolver = StoreHierarchyResolver::new(wiring::hierarchy_store(&config)?);
			let chain = resolver
				.resolve_site(&site_id)
				.await
				.with_context(|| format!("resolving site '{site_id}'"))?;
			print_json(&chain)
		}
		Command::ResolveProgram { kind, id } => {
			let resolver = StoreHierarchyResolver::new(wiring::hierarchy_store(&config)?);
			let anchor = kind.anchor(id);
			let chain = resolver
				.resolve_program(&anchor)
				.await
				.with_context(|| format!("resolving {}", anchor.uid()))?;
			print_json(&chain)
		}
		Command::Graph { request } => {
			let request: AuthorizationRequest = read_json(&request)?;
			strata_authorizer::validate_request(&request)?;
			let built = wiring::graph_builder(&config)?.build(&request).await?;
			print_json(&built)
		}
		Command::Batch { requests } => {
			let requests: Vec<AuthorizationRequest> = read_json(&requests)?;
			for request in &requests {
				strata_authorizer::validate_request(request)?;
			}
			let batch = wiring::graph_builder(&config)?
				.build_batch(&requests)
				.await?;
			print_json(&batch)
		}
		Command::Authorize { request } => {
			let authorizer = wiring::authorizer(&config)?;
			match read_json::<RequestInput>(&request)? {
				RequestInput::Single(request) => {
					let decision = authorizer.authorize(&request).await?;
					print_json(&decision)
				}
				RequestInput::Batch(requests) => {
					let decisions = authorizer.authorize_batch(&requests).await?;
					print_json(&decisions)
				}
			}
		}
		// Printed before configuration is loaded.
		Command::Version => Ok(()),
	}
}

/// Reads JSON from `path`, or from stdin when `path` is `-`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let content = if path == Path::new("-") {
		let mut buf = String::new();
		std::io::stdin()
			.read_to_string(&mut buf)
			.context("reading stdin")?;
		buf
	} else {
		std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
	};
	serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
