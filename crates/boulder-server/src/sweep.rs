// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Periodic reconciliation sweep.
//!
//! Lists all stored records on an interval and re-reconciles any that are
//! past their start date and not yet fully provisioned. This is what picks
//! up partially provisioned records after crashes, cancellations, or
//! exhausted retries.

use std::time::Duration;

use boulder_common_http::retry;
use boulder_server_db::DbError;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::{AppState, RetryableReconcile};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
	pub examined: usize,
	pub reconciled: usize,
	pub skipped_not_started: usize,
	pub failed: usize,
}

/// One pass over every stored record.
///
/// # Errors
/// Returns `DbError` only when the listing itself fails; per-record
/// reconcile failures are counted and logged, never fatal to the pass.
pub async fn run_sweep_once(state: &AppState) -> Result<SweepOutcome, DbError> {
	let now = Utc::now();
	let records = state.store.list().await?;

	let mut outcome = SweepOutcome::default();
	for record in records {
		if record.is_fully_provisioned() {
			continue;
		}
		outcome.examined += 1;

		if !record.has_started(now) {
			debug!(email = %record.email, date_start = %record.date_start, "start date not reached, skipping");
			outcome.skipped_not_started += 1;
			continue;
		}

		let result = retry(&state.retry, || {
			let record = record.clone();
			async move { state.reconciler.reconcile(record).await.map_err(RetryableReconcile) }
		})
		.await;

		match result {
			Ok(_) => outcome.reconciled += 1,
			Err(RetryableReconcile(e)) => {
				warn!(email = %record.email, error = %e, "sweep reconcile failed");
				outcome.failed += 1;
			}
		}
	}

	Ok(outcome)
}

/// Spawn the sweep loop.
pub fn spawn_sweep(state: AppState, interval: Duration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			match run_sweep_once(&state).await {
				Ok(outcome) => {
					if outcome.examined > 0 {
						info!(
							examined = outcome.examined,
							reconciled = outcome.reconciled,
							skipped_not_started = outcome.skipped_not_started,
							failed = outcome.failed,
							"reconciliation sweep complete"
						);
					}
				}
				Err(e) => error!(error = %e, "reconciliation sweep could not list users"),
			}
		}
	})
}
