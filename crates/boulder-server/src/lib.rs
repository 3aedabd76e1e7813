// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Boulder identity-provisioning HTTP server.
//!
//! Wires the validator, the state store, and the reconciler behind a small
//! axum surface: look up one user, list all users, create-and-provision a
//! user. A periodic sweep re-reconciles records that are not yet fully
//! provisioned.

pub mod api;
pub mod router;
pub mod routes;
pub mod sweep;

pub use api::{ApiError, AppState};
pub use router::create_router;
