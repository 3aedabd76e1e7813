// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The user record and its derived provisioning state.

use boulder_common_secret::SecretString;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One provisionable identity.
///
/// The email is the unique lookup key. The three id fields start empty and
/// are filled in by the reconciler as the corresponding platform resources
/// are discovered or created; an id field is non-empty if and only if its
/// existence flag is true. `version` is the optimistic-concurrency token
/// compared by the state store on upsert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
	pub given_name: String,
	pub family_name: String,
	pub email: String,
	pub date_start: DateTime<Utc>,
	/// Opaque scheduling hint carried through from the request or config.
	pub keep_alive: String,
	#[serde(skip)]
	pub default_password: SecretString,
	/// Display-oriented short name (first initial + family name). Never a
	/// lookup key.
	pub shortened_name: String,
	pub uaa_user_id: String,
	pub org_id: String,
	pub space_id: String,
	pub user_exists: bool,
	pub org_exists: bool,
	pub space_exists: bool,
	#[serde(skip)]
	pub version: i64,
}

/// Provisioning progress, always derived from the existence flags.
///
/// There is deliberately no stored status column; recomputing from the flags
/// keeps the state consistent across crashes and concurrent reconcilers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
	Unprovisioned,
	AccountCreated,
	OrgAssigned,
	FullyProvisioned,
}

impl UserRecord {
	pub fn provisioning_state(&self) -> ProvisioningState {
		match (self.user_exists, self.org_exists, self.space_exists) {
			(true, true, true) => ProvisioningState::FullyProvisioned,
			(true, true, false) => ProvisioningState::OrgAssigned,
			(true, false, _) => ProvisioningState::AccountCreated,
			(false, _, _) => ProvisioningState::Unprovisioned,
		}
	}

	pub fn is_fully_provisioned(&self) -> bool {
		self.provisioning_state() == ProvisioningState::FullyProvisioned
	}

	/// True once the user's start date has passed.
	pub fn has_started(&self, now: DateTime<Utc>) -> bool {
		self.date_start <= now
	}

	/// Name of the organization provisioned for this user.
	pub fn org_name(&self) -> String {
		format!("{}-org", self.shortened_name)
	}

	/// Name of the development space provisioned for this user.
	pub fn space_name(&self) -> String {
		format!("{}-dev", self.shortened_name)
	}

	/// Record a discovered or created identity account.
	pub fn assign_account(&mut self, id: String) {
		self.uaa_user_id = id;
		self.user_exists = true;
	}

	/// Record a discovered or created organization.
	pub fn assign_org(&mut self, id: String) {
		self.org_id = id;
		self.org_exists = true;
	}

	/// Record a discovered or created space.
	pub fn assign_space(&mut self, id: String) {
		self.space_id = id;
		self.space_exists = true;
	}
}

/// Derive the display short name: first initial of the given name plus the
/// family name, lower-cased.
pub fn shorten_name(given_name: &str, family_name: &str) -> String {
	let initial = given_name
		.chars()
		.next()
		.map(|c| c.to_lowercase().to_string())
		.unwrap_or_default();
	format!("{}{}", initial, family_name.to_lowercase())
}
