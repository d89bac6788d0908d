//! Race-control message ingester
//!
//! One row per control-room communication. Messages arrive from two feeds
//! with different clocks: some carry elapsed seconds directly, others only an
//! absolute wall-clock instant that must be re-based against the session
//! start reference captured once per session. Rows with no message text are
//! dropped, as are rows whose timestamp cannot be resolved either way.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

use super::{as_int, Category};
use crate::provider::models::{RawControlMessage, SessionBundle};
use crate::provider::time::{elapsed_since, parse_wall_clock};
use crate::store::inventory::category_present;

/// Typed message row ready for insertion
#[derive(Debug, PartialEq)]
pub(crate) struct MessageRow {
    pub session_time_seconds: f64,
    pub category: Option<String>,
    pub message: String,
    pub status: Option<String>,
    pub driver_number: Option<i32>,
    pub flag: Option<String>,
    pub scope: Option<String>,
    pub sector: Option<i32>,
    pub lap_number: Option<i32>,
}

/// Ingest the race-control slice for one session, returning rows inserted
pub async fn ingest(pool: &PgPool, bundle: &SessionBundle, session_id: i32) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    if category_present(&mut *tx, session_id, Category::Messages).await? {
        debug!(session_id, "Messages already present, skipping");
        return Ok(0);
    }

    let (rows, dropped) = build_message_rows(&bundle.race_control, bundle.start_time_utc);

    let mut inserted = 0u64;

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO race_control_messages (
                session_id, session_time_seconds, category, message, status,
                driver_number, flag, scope, sector, lap_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session_id)
        .bind(row.session_time_seconds)
        .bind(&row.category)
        .bind(&row.message)
        .bind(&row.status)
        .bind(row.driver_number)
        .bind(&row.flag)
        .bind(&row.scope)
        .bind(row.sector)
        .bind(row.lap_number)
        .execute(&mut *tx)
        .await
        .context("Failed to insert race control message")?;

        inserted += 1;
    }

    tx.commit().await.context("Failed to commit messages")?;

    if dropped > 0 {
        debug!(session_id, dropped, "Dropped messages without text or resolvable timestamp");
    }

    info!(session_id, inserted, "Ingested race control messages");

    Ok(inserted)
}

/// Transform the upstream message slice, normalizing both timestamp forms
pub(crate) fn build_message_rows(
    messages: &[RawControlMessage],
    session_start: Option<DateTime<Utc>>,
) -> (Vec<MessageRow>, usize) {
    let mut rows = Vec::with_capacity(messages.len());
    let mut dropped = 0;

    for raw in messages {
        let text = raw.message.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            dropped += 1;
            continue;
        }
        let Some(time) = message_elapsed(raw, session_start) else {
            dropped += 1;
            continue;
        };

        rows.push(MessageRow {
            session_time_seconds: time,
            category: raw.category.clone(),
            message: text.to_string(),
            status: raw.status.clone(),
            driver_number: raw
                .driver_number
                .as_deref()
                .and_then(|n| n.trim().parse().ok()),
            flag: raw.flag.clone(),
            scope: raw.scope.clone(),
            sector: as_int(raw.sector),
            lap_number: as_int(raw.lap_number),
        });
    }

    (rows, dropped)
}

/// Resolve a message timestamp to elapsed seconds.
///
/// Elapsed form wins when both are present; the wall-clock form needs the
/// session-start reference and resolves to None without it.
pub(crate) fn message_elapsed(
    raw: &RawControlMessage,
    session_start: Option<DateTime<Utc>>,
) -> Option<f64> {
    if let Some(elapsed) = raw.session_time_seconds {
        return Some(elapsed);
    }

    let start = session_start?;
    let instant = raw.time_utc.as_deref().and_then(parse_wall_clock)?;

    Some(elapsed_since(start, instant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap())
    }

    fn message(text: Option<&str>) -> RawControlMessage {
        RawControlMessage {
            message: text.map(String::from),
            session_time_seconds: Some(65.0),
            ..RawControlMessage::default()
        }
    }

    #[test]
    fn test_elapsed_timestamp_used_directly() {
        let raw = message(Some("GREEN LIGHT - PIT EXIT OPEN"));
        assert_eq!(message_elapsed(&raw, start()), Some(65.0));
    }

    #[test]
    fn test_wall_clock_timestamp_rebased() {
        let raw = RawControlMessage {
            message: Some("YELLOW IN TRACK SECTOR 7".to_string()),
            time_utc: Some("2024-03-02T15:20:30Z".to_string()),
            ..RawControlMessage::default()
        };
        assert_eq!(message_elapsed(&raw, start()), Some(1_230.0));
    }

    #[test]
    fn test_wall_clock_unresolvable_without_session_start() {
        let raw = RawControlMessage {
            message: Some("DRS ENABLED".to_string()),
            time_utc: Some("2024-03-02T15:20:30Z".to_string()),
            ..RawControlMessage::default()
        };
        assert_eq!(message_elapsed(&raw, None), None);
    }

    #[test]
    fn test_build_message_rows_drops_textless_rows() {
        let messages = vec![
            message(Some("CAR 4 (NOR) TIME 1:21.971 DELETED")),
            message(None),
            message(Some("   ")),
        ];

        let (rows, dropped) = build_message_rows(&messages, start());
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_build_message_rows_parses_driver_number() {
        let mut raw = message(Some("CAR 44 UNDER INVESTIGATION"));
        raw.driver_number = Some("44".to_string());

        let (rows, _) = build_message_rows(&[raw], start());
        assert_eq!(rows[0].driver_number, Some(44));
    }
}
