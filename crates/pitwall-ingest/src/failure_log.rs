//! Durable failure log
//!
//! One JSON document per season recording every unit that did not fully
//! ingest. The document accumulates across runs: existing records are loaded
//! at run start and the file is rewritten in full with old and new records
//! merged, so a later reconciliation pass sees the complete history.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pitwall_common::SessionKind;

/// One failed ingestion unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub timestamp: DateTime<Utc>,
    pub season: i32,
    pub round: i32,
    pub event: String,
    pub session: SessionKind,
    pub error: String,
}

/// On-disk document shape
#[derive(Debug, Serialize, Deserialize)]
struct FailureDocument {
    season: i32,
    updated_at: DateTime<Utc>,
    failures: Vec<FailureRecord>,
}

/// Append-accumulating failure log for one season
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    season: i32,
    records: Vec<FailureRecord>,
    added: usize,
}

impl FailureLog {
    /// Load the season's log, starting empty when none exists yet.
    ///
    /// An unreadable document is reported and replaced rather than aborting
    /// the run; the season driver must always get to its summary.
    pub fn load(dir: &Path, season: i32) -> Self {
        let path = dir.join(format!("ingest_failures_{}.json", season));

        let records = match fs::read_to_string(&path) {
            Ok(body) => match serde_json::from_str::<FailureDocument>(&body) {
                Ok(document) => {
                    debug!(
                        path = %path.display(),
                        existing = document.failures.len(),
                        "Loaded existing failure log"
                    );
                    document.failures
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Failure log unreadable, starting a fresh document"
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            path,
            season,
            records,
            added: 0,
        }
    }

    /// Record one failed unit
    pub fn record(&mut self, round: i32, event: &str, session: SessionKind, error: String) {
        self.records.push(FailureRecord {
            timestamp: Utc::now(),
            season: self.season,
            round,
            event: event.to_string(),
            session,
            error,
        });
        self.added += 1;
    }

    /// Number of records added during this run
    pub fn added(&self) -> usize {
        self.added
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the document with old and new records merged.
    ///
    /// A no-op when this run added nothing, leaving an existing document
    /// untouched.
    pub fn persist(&self) -> Result<()> {
        if self.added == 0 {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let document = FailureDocument {
            season: self.season,
            updated_at: Utc::now(),
            failures: self.records.clone(),
        };

        let body = serde_json::to_string_pretty(&document)?;
        fs::write(&self.path, body)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        debug!(
            path = %self.path.display(),
            total = self.records.len(),
            added = self.added,
            "Persisted failure log"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_log_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::load(dir.path(), 2024);
        assert_eq!(log.records.len(), 0);
        assert_eq!(log.added(), 0);
    }

    #[test]
    fn test_records_merge_across_runs() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = FailureLog::load(dir.path(), 2024);
        first.record(3, "Australian Grand Prix", SessionKind::Race, "timeout".into());
        first.persist().unwrap();

        let mut second = FailureLog::load(dir.path(), 2024);
        assert_eq!(second.records.len(), 1);
        second.record(7, "Monaco Grand Prix", SessionKind::Qualifying, "rate limited".into());
        second.persist().unwrap();

        let third = FailureLog::load(dir.path(), 2024);
        assert_eq!(third.records.len(), 2);
        assert_eq!(third.records[0].round, 3);
        assert_eq!(third.records[1].round, 7);
    }

    #[test]
    fn test_persist_without_additions_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();

        let log = FailureLog::load(dir.path(), 2024);
        log.persist().unwrap();
        assert!(!log.path().exists());
    }

    #[test]
    fn test_corrupt_log_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingest_failures_2024.json");
        fs::write(&path, "{ not json").unwrap();

        let mut log = FailureLog::load(dir.path(), 2024);
        assert_eq!(log.records.len(), 0);

        log.record(1, "Bahrain Grand Prix", SessionKind::Race, "boom".into());
        log.persist().unwrap();

        let reloaded = FailureLog::load(dir.path(), 2024);
        assert_eq!(reloaded.records.len(), 1);
    }
}
