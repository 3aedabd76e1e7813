// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures for server integration tests: stub providers over an
//! in-memory SQLite store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use boulder_common_http::RetryConfig;
use boulder_common_secret::SecretString;
use boulder_provisioning_core::user::shorten_name;
use boulder_provisioning_core::{
	ProviderError, Reconciler, ResourceKind, ResourceProvider, UserRecord,
};
use boulder_server::AppState;
use boulder_server_db::{testing, UserRepository};
use chrono::{DateTime, Utc};

#[allow(dead_code)]
pub enum StubMode {
	Normal,
	Unauthorized,
	Transient,
}

pub struct StubProvider {
	kind: ResourceKind,
	next_id: String,
	mode: StubMode,
	existing: Mutex<Option<String>>,
}

impl StubProvider {
	pub fn new(kind: ResourceKind, next_id: &str) -> Self {
		Self {
			kind,
			next_id: next_id.to_string(),
			mode: StubMode::Normal,
			existing: Mutex::new(None),
		}
	}

	#[allow(dead_code)]
	pub fn with_mode(mut self, mode: StubMode) -> Self {
		self.mode = mode;
		self
	}
}

#[async_trait]
impl ResourceProvider for StubProvider {
	fn kind(&self) -> ResourceKind {
		self.kind
	}

	async fn find(&self, _record: &UserRecord) -> Result<Option<String>, ProviderError> {
		Ok(self.existing.lock().unwrap().clone())
	}

	async fn create(&self, _record: &UserRecord) -> Result<String, ProviderError> {
		match self.mode {
			StubMode::Normal => {
				*self.existing.lock().unwrap() = Some(self.next_id.clone());
				Ok(self.next_id.clone())
			}
			StubMode::Unauthorized => Err(ProviderError::Unauthorized("stub".to_string())),
			StubMode::Transient => Err(ProviderError::Transient("stub".to_string())),
		}
	}
}

pub fn default_stubs() -> (StubProvider, StubProvider, StubProvider) {
	(
		StubProvider::new(ResourceKind::IdentityAccount, "uaa-1"),
		StubProvider::new(ResourceKind::Organization, "org-1"),
		StubProvider::new(ResourceKind::Space, "space-1"),
	)
}

pub async fn build_state(
	identity: StubProvider,
	orgs: StubProvider,
	spaces: StubProvider,
) -> AppState {
	let pool = testing::create_test_pool().await;
	testing::create_users_table(&pool).await;
	let store = Arc::new(UserRepository::new(pool.clone()));
	let reconciler = Arc::new(Reconciler::new(
		Arc::clone(&store),
		Arc::new(identity) as Arc<dyn ResourceProvider>,
		Arc::new(orgs) as Arc<dyn ResourceProvider>,
		Arc::new(spaces) as Arc<dyn ResourceProvider>,
	));
	AppState {
		pool,
		store,
		reconciler,
		default_password: Some(SecretString::from("Def1")),
		default_keep_alive: "720h".to_string(),
		retry: RetryConfig {
			max_attempts: 2,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(2),
			backoff_factor: 1.0,
			jitter: false,
		},
	}
}

#[allow(dead_code)]
pub fn record(email: &str, date_start: DateTime<Utc>) -> UserRecord {
	UserRecord {
		given_name: "Jane".to_string(),
		family_name: "Smith".to_string(),
		email: email.to_string(),
		date_start,
		keep_alive: "720h".to_string(),
		default_password: SecretString::from("Def1"),
		shortened_name: shorten_name("Jane", "Smith"),
		uaa_user_id: String::new(),
		org_id: String::new(),
		space_id: String::new(),
		user_exists: false,
		org_exists: false,
		space_exists: false,
		version: 0,
	}
}
