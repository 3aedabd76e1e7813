// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP status and transport error mapping shared by all platform clients.

use boulder_provisioning_core::ProviderError;
use reqwest::StatusCode;

/// Map a non-success HTTP status to the capability error taxonomy.
pub(crate) fn map_status(status: StatusCode, context: &str) -> ProviderError {
	match status {
		StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => ProviderError::AlreadyExists,
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
			ProviderError::Unauthorized(format!("{context}: {status}"))
		}
		StatusCode::TOO_MANY_REQUESTS => ProviderError::QuotaExceeded(format!("{context}: {status}")),
		StatusCode::REQUEST_TIMEOUT => ProviderError::Transient(format!("{context}: {status}")),
		s if s.is_server_error() => ProviderError::Transient(format!("{context}: {status}")),
		_ => ProviderError::Rejected(format!("{context}: unexpected status {status}")),
	}
}

/// Map a transport-level failure. Timeouts and connection errors are
/// transient; anything else is a protocol bug.
pub(crate) fn from_reqwest(e: reqwest::Error, context: &str) -> ProviderError {
	if e.is_timeout() || e.is_connect() || e.is_request() {
		ProviderError::Transient(format!("{context}: {e}"))
	} else {
		ProviderError::Rejected(format!("{context}: {e}"))
	}
}
