// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Concrete platform provider clients for Boulder.
//!
//! This crate provides:
//! - The UAA identity-account client (SCIM Users API)
//! - Organization and space clients against the cloud controller v2 API
//!
//! Each client implements the core `ResourceProvider` capability; the
//! reconciler never sees anything below that trait.

mod cloud_controller;
mod error;
mod token;
mod uaa;

pub use cloud_controller::{cloud_controller_providers, CloudControllerConfig, OrgProvider, SpaceProvider};
pub use uaa::{UaaConfig, UaaIdentityClient};
