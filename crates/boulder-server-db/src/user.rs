// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! Implements the core `UserStore` contract on SQLite. Upserts are guarded
//! by a version column: a record with version 0 has never been persisted
//! and is inserted; any other version must match the stored row or the
//! write fails with `Conflict`. Timestamps are stored as RFC 3339 TEXT.

use async_trait::async_trait;
use boulder_common_secret::SecretString;
use boulder_provisioning_core::{StoreError, UserRecord, UserStore};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;

/// Repository for user-record database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Look up a user by email.
	///
	/// # Errors
	/// Returns `DbError::Sqlx` on query failure.
	#[tracing::instrument(skip(self))]
	pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
		let row = sqlx::query("SELECT * FROM users WHERE email = ?")
			.bind(email)
			.fetch_optional(&self.pool)
			.await?;

		row.map(row_to_record).transpose()
	}

	/// List all users, ordered by email.
	///
	/// # Errors
	/// Returns `DbError::Sqlx` on query failure.
	#[tracing::instrument(skip(self))]
	pub async fn list(&self) -> Result<Vec<UserRecord>, DbError> {
		let rows = sqlx::query("SELECT * FROM users ORDER BY email")
			.fetch_all(&self.pool)
			.await?;

		rows.into_iter().map(row_to_record).collect()
	}

	/// Insert or update a record, enforcing the version check.
	///
	/// Returns the stored record with its bumped version.
	///
	/// # Errors
	/// Returns `DbError::Conflict` when the email already exists (fresh
	/// insert) or the version no longer matches (concurrent update).
	#[tracing::instrument(skip(self, record), fields(email = %record.email, version = record.version))]
	pub async fn upsert(&self, record: &UserRecord) -> Result<UserRecord, DbError> {
		let now = Utc::now().to_rfc3339();
		let mut stored = record.clone();
		stored.version = record.version + 1;

		if record.version == 0 {
			let result = sqlx::query(
				r#"
				INSERT INTO users (
					email, given_name, family_name, shortened_name, date_start,
					keep_alive, default_password, uaa_user_id, org_id, space_id,
					user_exists, org_exists, space_exists, version, created_at, updated_at
				)
				VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
				"#,
			)
			.bind(&record.email)
			.bind(&record.given_name)
			.bind(&record.family_name)
			.bind(&record.shortened_name)
			.bind(record.date_start.to_rfc3339())
			.bind(&record.keep_alive)
			.bind(record.default_password.expose())
			.bind(&record.uaa_user_id)
			.bind(&record.org_id)
			.bind(&record.space_id)
			.bind(record.user_exists)
			.bind(record.org_exists)
			.bind(record.space_exists)
			.bind(stored.version)
			.bind(&now)
			.bind(&now)
			.execute(&self.pool)
			.await;

			match result {
				Ok(_) => Ok(stored),
				Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DbError::Conflict(
					format!("user {} already exists", record.email),
				)),
				Err(e) => Err(e.into()),
			}
		} else {
			let result = sqlx::query(
				r#"
				UPDATE users SET
					given_name = ?, family_name = ?, shortened_name = ?, date_start = ?,
					keep_alive = ?, default_password = ?, uaa_user_id = ?, org_id = ?,
					space_id = ?, user_exists = ?, org_exists = ?, space_exists = ?,
					version = ?, updated_at = ?
				WHERE email = ? AND version = ?
				"#,
			)
			.bind(&record.given_name)
			.bind(&record.family_name)
			.bind(&record.shortened_name)
			.bind(record.date_start.to_rfc3339())
			.bind(&record.keep_alive)
			.bind(record.default_password.expose())
			.bind(&record.uaa_user_id)
			.bind(&record.org_id)
			.bind(&record.space_id)
			.bind(record.user_exists)
			.bind(record.org_exists)
			.bind(record.space_exists)
			.bind(stored.version)
			.bind(&now)
			.bind(&record.email)
			.bind(record.version)
			.execute(&self.pool)
			.await?;

			if result.rows_affected() == 0 {
				return Err(DbError::Conflict(format!(
					"user {} was modified concurrently (version {})",
					record.email, record.version
				)));
			}
			Ok(stored)
		}
	}
}

#[async_trait]
impl UserStore for UserRepository {
	async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
		UserRepository::get_by_email(self, email).await.map_err(Into::into)
	}

	async fn upsert(&self, record: &UserRecord) -> Result<UserRecord, StoreError> {
		UserRepository::upsert(self, record).await.map_err(Into::into)
	}

	async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
		UserRepository::list(self).await.map_err(Into::into)
	}
}

fn row_to_record(row: sqlx::sqlite::SqliteRow) -> Result<UserRecord, DbError> {
	let date_start: String = row.get("date_start");
	let date_start = DateTime::parse_from_rfc3339(&date_start)
		.map(|d| d.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("invalid date_start in store: {e}")))?;

	Ok(UserRecord {
		given_name: row.get("given_name"),
		family_name: row.get("family_name"),
		email: row.get("email"),
		date_start,
		keep_alive: row.get("keep_alive"),
		default_password: SecretString::new(row.get("default_password")),
		shortened_name: row.get("shortened_name"),
		uaa_user_id: row.get("uaa_user_id"),
		org_id: row.get("org_id"),
		space_id: row.get("space_id"),
		user_exists: row.get("user_exists"),
		org_exists: row.get("org_exists"),
		space_exists: row.get("space_exists"),
		version: row.get("version"),
	})
}
