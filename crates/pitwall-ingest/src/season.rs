//! Season driver
//!
//! Walks a season's schedule one round at a time, runs the orchestrator for
//! every requested session kind, and folds unit outcomes into run statistics
//! plus the durable failure log. Only a schedule-level error aborts the run
//! (there is nothing sensible to iterate without one); everything below that
//! is accounted for and the run always reaches its summary.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use pitwall_common::SessionKind;

use crate::config::IngestConfig;
use crate::failure_log::FailureLog;
use crate::fetch::SessionFetcher;
use crate::orchestrator::{SessionOrchestrator, UnitOutcome};
use crate::provider::ProviderClient;

/// Accumulated counts for one season run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Units ingested to completion during this run
    pub newly_ingested: usize,
    /// Units already complete in storage; zero upstream calls spent
    pub already_complete: usize,
    /// Units that do not exist upstream; expected, not failures
    pub not_available: usize,
    /// Units that failed to fetch or only partially ingested
    pub failed: usize,
    /// Total rows inserted across all categories
    pub rows_inserted: u64,
}

impl RunStats {
    pub fn units_processed(&self) -> usize {
        self.newly_ingested + self.already_complete + self.not_available + self.failed
    }
}

/// Ingest one season: every non-testing round times every requested kind
pub async fn run_season(
    config: &IngestConfig,
    pool: &PgPool,
    client: &ProviderClient,
    year: i32,
    kinds: &[SessionKind],
    strict: bool,
) -> Result<RunStats> {
    info!(year, kinds = ?kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>(), strict, "Starting season ingestion");

    // Without a schedule there is nothing to iterate; this error is fatal.
    let schedule = client
        .schedule(year)
        .await
        .with_context(|| format!("Failed to fetch {} schedule", year))?;

    info!(events = schedule.len(), "Fetched season schedule");

    let fetcher = SessionFetcher::new(client, config.retry);
    let orchestrator = SessionOrchestrator::new(pool, fetcher, strict);

    let mut failure_log = FailureLog::load(&config.failure_log_dir, year);
    let mut stats = RunStats::default();

    for event in &schedule {
        // Round 0 is pre-season testing; no competitive sessions to ingest
        if event.round_number == 0 {
            info!(event = %event.event_name, "Skipping testing event");
            continue;
        }

        info!(
            round = event.round_number,
            event = %event.event_name,
            "Processing round"
        );

        for &kind in kinds {
            let outcome = orchestrator.run_unit(event, year, kind).await?;

            match outcome {
                UnitOutcome::AlreadyComplete => stats.already_complete += 1,
                UnitOutcome::Ingested { rows } => {
                    stats.newly_ingested += 1;
                    stats.rows_inserted += rows;
                }
                UnitOutcome::NotAvailable => stats.not_available += 1,
                UnitOutcome::PartiallyIngested { rows, failed } => {
                    stats.failed += 1;
                    stats.rows_inserted += rows;

                    let detail = failed
                        .iter()
                        .map(|(category, error)| format!("{}: {}", category, error))
                        .collect::<Vec<_>>()
                        .join("; ");
                    failure_log.record(event.round_number, &event.event_name, kind, detail);
                }
                UnitOutcome::Failed { error } => {
                    stats.failed += 1;
                    failure_log.record(event.round_number, &event.event_name, kind, error);
                }
            }
        }
    }

    failure_log.persist()?;

    info!(
        year,
        newly_ingested = stats.newly_ingested,
        already_complete = stats.already_complete,
        not_available = stats.not_available,
        failed = stats.failed,
        rows_inserted = stats.rows_inserted,
        "Season ingestion complete"
    );

    if stats.failed > 0 {
        warn!(
            failures = failure_log.added(),
            log_path = %failure_log.path().display(),
            "Some units did not fully ingest; see the failure log and run the audit tool for a completeness report"
        );
    }

    Ok(stats)
}
