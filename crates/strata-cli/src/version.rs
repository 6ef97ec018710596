// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"strata version: {}\n\
		 Platform:       {}-{}\n\
		 User-Agent:     {}",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH,
		strata_common_http::user_agent(),
	)
}
