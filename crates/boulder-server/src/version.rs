// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Human-readable version line for the `version` subcommand.
pub fn format_version_info() -> String {
	format!("boulder-server {}", env!("CARGO_PKG_VERSION"))
}
