//! Session orchestrator
//!
//! Runs one (season, round, session-kind) unit end to end: consult the
//! existence checker, fetch from upstream only when something is missing,
//! create the session row on first contact, dispatch exactly the absent
//! category ingesters, and fold their results into a single unit outcome.
//!
//! Category failures are isolated: a malformed weather slice must not cost
//! the laps and results of the same session. Strict mode inverts that for
//! fail-fast diagnostics and re-raises the first ingester error.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use pitwall_common::SessionKind;

use crate::categories::{self, Category};
use crate::fetch::{FetchOutcome, SessionFetcher};
use crate::provider::models::{RawScheduleEvent, SessionBundle};
use crate::store::inventory::SessionInventory;
use crate::store::{circuits, sessions};

/// Terminal outcome of one ingestion unit
#[derive(Debug)]
pub enum UnitOutcome {
    /// All five categories were already present; no upstream contact
    AlreadyComplete,
    /// Every missing category ingested successfully
    Ingested { rows: u64 },
    /// At least one category ingested and at least one failed
    PartiallyIngested {
        rows: u64,
        failed: Vec<(Category, String)>,
    },
    /// The session does not exist upstream; expected for sprint kinds
    /// at non-sprint events
    NotAvailable,
    /// Fetch or session-row creation failed; nothing further was attempted
    Failed { error: String },
}

/// Orchestrates the per-unit pipeline
pub struct SessionOrchestrator<'a> {
    pool: &'a PgPool,
    fetcher: SessionFetcher<'a>,
    strict: bool,
}

impl<'a> SessionOrchestrator<'a> {
    pub fn new(pool: &'a PgPool, fetcher: SessionFetcher<'a>, strict: bool) -> Self {
        Self {
            pool,
            fetcher,
            strict,
        }
    }

    /// Run one unit to a terminal state.
    ///
    /// Returns Err only in strict mode, where the first category failure
    /// aborts the whole run; every other failure is folded into the outcome.
    pub async fn run_unit(
        &self,
        event: &RawScheduleEvent,
        year: i32,
        kind: SessionKind,
    ) -> Result<UnitOutcome> {
        let round = event.round_number;

        let inventory = match SessionInventory::check(self.pool, year, round, kind).await {
            Ok(inventory) => inventory,
            Err(err) => {
                return Ok(UnitOutcome::Failed {
                    error: format!("existence check failed: {:#}", err),
                })
            }
        };

        if inventory.is_complete() {
            debug!(year, round, kind = %kind, "All categories present, skipping");
            return Ok(UnitOutcome::AlreadyComplete);
        }

        let missing = inventory.missing();
        debug!(
            year,
            round,
            kind = %kind,
            missing = ?missing.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            "Fetching session for missing categories"
        );

        let bundle = match self.fetcher.fetch(year, round, kind).await {
            Ok(FetchOutcome::Loaded(bundle)) => bundle,
            Ok(FetchOutcome::NotAvailable) => return Ok(UnitOutcome::NotAvailable),
            Err(err) => {
                warn!(year, round, kind = %kind, error = %format!("{:#}", err), "Session fetch failed");
                return Ok(UnitOutcome::Failed {
                    error: format!("{:#}", err),
                });
            }
        };

        let session_id = match self.ensure_session(&inventory, event, year, kind).await {
            Ok(id) => id,
            Err(err) => {
                return Ok(UnitOutcome::Failed {
                    error: format!("session row creation failed: {:#}", err),
                })
            }
        };

        let mut rows = 0u64;
        let mut failed: Vec<(Category, String)> = Vec::new();

        for category in missing {
            match self.dispatch(category, &bundle, session_id, year, kind).await {
                Ok(count) => rows += count,
                Err(err) if self.strict => {
                    return Err(err).with_context(|| {
                        format!(
                            "{} ingestion failed for {} round {} {} (strict mode)",
                            category, year, round, kind
                        )
                    });
                }
                Err(err) => {
                    error!(
                        year,
                        round,
                        kind = %kind,
                        category = %category,
                        error = %format!("{:#}", err),
                        "Category ingestion failed, continuing with siblings"
                    );
                    failed.push((category, format!("{:#}", err)));
                }
            }
        }

        if failed.is_empty() {
            info!(year, round, kind = %kind, rows, "Session fully ingested");
            Ok(UnitOutcome::Ingested { rows })
        } else {
            Ok(UnitOutcome::PartiallyIngested { rows, failed })
        }
    }

    /// Resolve the session row id, creating circuit and session on first contact
    async fn ensure_session(
        &self,
        inventory: &SessionInventory,
        event: &RawScheduleEvent,
        year: i32,
        kind: SessionKind,
    ) -> Result<i32> {
        if let Some(id) = inventory.session_id {
            return Ok(id);
        }

        let circuit_id = circuits::find_or_create(self.pool, event).await?;

        sessions::find_or_create(
            self.pool,
            &sessions::NewSession {
                year,
                round: event.round_number,
                kind,
                event_name: &event.event_name,
                date: event.event_date,
                circuit_id,
            },
        )
        .await
    }

    async fn dispatch(
        &self,
        category: Category,
        bundle: &SessionBundle,
        session_id: i32,
        year: i32,
        kind: SessionKind,
    ) -> Result<u64> {
        match category {
            Category::Results => {
                categories::results::ingest(self.pool, bundle, session_id, year, kind).await
            }
            Category::Laps => categories::laps::ingest(self.pool, bundle, session_id).await,
            Category::Weather => categories::weather::ingest(self.pool, bundle, session_id).await,
            Category::TrackStatus => {
                categories::track_status::ingest(self.pool, bundle, session_id).await
            }
            Category::Messages => categories::messages::ingest(self.pool, bundle, session_id).await,
        }
    }
}
