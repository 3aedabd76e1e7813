// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core provisioning domain for Boulder.
//!
//! This crate provides:
//! - The `UserRecord` model and its derived provisioning state
//! - Request validation (email grammar, start-date format, password fallback)
//! - The `ResourceProvider` capability boundary and `UserStore` contract
//! - The reconciler that converges a record against the three platform
//!   resources (identity account, organization, space)
//!
//! Everything here is I/O-free apart from the traits it consumes, so the
//! whole provisioning protocol is testable with in-memory fakes.

pub mod provider;
pub mod reconcile;
pub mod store;
pub mod user;
pub mod validate;

pub use provider::{ProviderError, ResourceKind, ResourceProvider};
pub use reconcile::{ReconcileError, Reconciler};
pub use store::{StoreError, UserStore};
pub use user::{ProvisioningState, UserRecord};
pub use validate::{validate, CreateUserRequest, ValidationError, DATE_START_FORMAT};
