//! Track-status ingester
//!
//! One row per status transition (flags, safety car deployments). A
//! transition without a status code carries no information and is dropped;
//! one without a timestamp cannot be placed on the session timeline and is
//! dropped as well. The human-readable message is optional.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{debug, info};

use super::Category;
use crate::provider::models::{RawTrackStatusEvent, SessionBundle};
use crate::store::inventory::category_present;

/// Typed track-status row ready for insertion
#[derive(Debug, PartialEq)]
pub(crate) struct TrackStatusRow {
    pub session_time_seconds: f64,
    pub status: String,
    pub message: Option<String>,
}

/// Ingest the track-status slice for one session, returning rows inserted
pub async fn ingest(pool: &PgPool, bundle: &SessionBundle, session_id: i32) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    if category_present(&mut *tx, session_id, Category::TrackStatus).await? {
        debug!(session_id, "Track status already present, skipping");
        return Ok(0);
    }

    let (rows, dropped) = build_status_rows(&bundle.track_status);

    let mut inserted = 0u64;

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO track_status (session_id, session_time_seconds, status, message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session_id)
        .bind(row.session_time_seconds)
        .bind(&row.status)
        .bind(&row.message)
        .execute(&mut *tx)
        .await
        .context("Failed to insert track status")?;

        inserted += 1;
    }

    tx.commit().await.context("Failed to commit track status")?;

    if dropped > 0 {
        debug!(session_id, dropped, "Dropped track-status rows without status code");
    }

    info!(session_id, inserted, "Ingested track status");

    Ok(inserted)
}

/// Transform the upstream track-status slice, dropping codeless rows
pub(crate) fn build_status_rows(events: &[RawTrackStatusEvent]) -> (Vec<TrackStatusRow>, usize) {
    let mut rows = Vec::with_capacity(events.len());
    let mut dropped = 0;

    for raw in events {
        let status = raw.status.as_deref().map(str::trim).unwrap_or_default();
        if status.is_empty() {
            dropped += 1;
            continue;
        }
        let Some(time) = raw.session_time_seconds else {
            dropped += 1;
            continue;
        };

        rows.push(TrackStatusRow {
            session_time_seconds: time,
            status: status.to_string(),
            message: raw.message.clone(),
        });
    }

    (rows, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status_rows_keeps_coded_transitions() {
        let events = vec![RawTrackStatusEvent {
            session_time_seconds: Some(310.2),
            status: Some("4".to_string()),
            message: Some("SAFETY CAR DEPLOYED".to_string()),
        }];

        let (rows, dropped) = build_status_rows(&events);
        assert_eq!(dropped, 0);
        assert_eq!(
            rows[0],
            TrackStatusRow {
                session_time_seconds: 310.2,
                status: "4".to_string(),
                message: Some("SAFETY CAR DEPLOYED".to_string()),
            }
        );
    }

    #[test]
    fn test_build_status_rows_drops_codeless_rows() {
        let events = vec![
            RawTrackStatusEvent {
                session_time_seconds: Some(1.0),
                status: None,
                message: Some("orphan".to_string()),
            },
            RawTrackStatusEvent {
                session_time_seconds: Some(2.0),
                status: Some("  ".to_string()),
                message: None,
            },
            RawTrackStatusEvent {
                session_time_seconds: None,
                status: Some("1".to_string()),
                message: None,
            },
        ];

        let (rows, dropped) = build_status_rows(&events);
        assert!(rows.is_empty());
        assert_eq!(dropped, 3);
    }

    #[test]
    fn test_build_status_rows_message_optional() {
        let events = vec![RawTrackStatusEvent {
            session_time_seconds: Some(0.0),
            status: Some("1".to_string()),
            message: None,
        }];

        let (rows, _) = build_status_rows(&events);
        assert_eq!(rows[0].message, None);
    }
}
