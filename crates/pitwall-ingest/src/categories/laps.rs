//! Laps ingester
//!
//! One row per completed or attempted lap per participant; the largest slice
//! by row count. Rows with no lap number are unidentifiable against the
//! (session, driver, lap) key and are dropped. Pit duration is derived at
//! storage time from the two pit endpoints.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{debug, info};

use super::{as_int, Category};
use crate::provider::models::{RawLap, SessionBundle};
use crate::store::inventory::category_present;
use crate::store::participants::{ensure_driver, DriverSighting};

/// Typed lap row ready for insertion, keyed by driver code
#[derive(Debug)]
pub(crate) struct LapRow {
    pub driver_code: String,
    pub lap_number: i32,
    pub lap_time_seconds: Option<f64>,
    pub sector1_time_seconds: Option<f64>,
    pub sector2_time_seconds: Option<f64>,
    pub sector3_time_seconds: Option<f64>,
    pub lap_start_time_seconds: Option<f64>,
    pub sector1_session_time_seconds: Option<f64>,
    pub sector2_session_time_seconds: Option<f64>,
    pub sector3_session_time_seconds: Option<f64>,
    pub pit_in_time_seconds: Option<f64>,
    pub pit_out_time_seconds: Option<f64>,
    pub pit_duration_seconds: Option<f64>,
    pub stint: Option<i32>,
    pub speed_i1: Option<f64>,
    pub speed_i2: Option<f64>,
    pub speed_fl: Option<f64>,
    pub speed_st: Option<f64>,
    pub compound: Option<String>,
    pub tyre_life: Option<i32>,
    pub fresh_tyre: Option<bool>,
    pub position: Option<i32>,
    pub track_status: Option<String>,
    pub is_personal_best: Option<bool>,
    pub is_accurate: Option<bool>,
    pub deleted: Option<bool>,
    pub deleted_reason: Option<String>,
    driver_number: Option<i32>,
}

/// Ingest the lap slice for one session, returning rows inserted
pub async fn ingest(pool: &PgPool, bundle: &SessionBundle, session_id: i32) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    if category_present(&mut *tx, session_id, Category::Laps).await? {
        debug!(session_id, "Laps already present, skipping");
        return Ok(0);
    }

    let (rows, dropped) = build_lap_rows(&bundle.laps);

    let mut inserted = 0u64;

    for row in &rows {
        let driver_id = ensure_driver(
            &mut tx,
            &DriverSighting {
                code: &row.driver_code,
                driver_number: row.driver_number,
                ..DriverSighting::default()
            },
        )
        .await?;

        sqlx::query(
            r#"
            INSERT INTO laps (
                session_id, driver_id, lap_number,
                lap_time_seconds, sector1_time_seconds, sector2_time_seconds,
                sector3_time_seconds, lap_start_time_seconds,
                sector1_session_time_seconds, sector2_session_time_seconds,
                sector3_session_time_seconds, pit_in_time_seconds,
                pit_out_time_seconds, pit_duration_seconds, stint,
                speed_i1, speed_i2, speed_fl, speed_st,
                compound, tyre_life, fresh_tyre, position, track_status,
                is_personal_best, is_accurate, deleted, deleted_reason
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
                $27, $28
            )
            "#,
        )
        .bind(session_id)
        .bind(driver_id)
        .bind(row.lap_number)
        .bind(row.lap_time_seconds)
        .bind(row.sector1_time_seconds)
        .bind(row.sector2_time_seconds)
        .bind(row.sector3_time_seconds)
        .bind(row.lap_start_time_seconds)
        .bind(row.sector1_session_time_seconds)
        .bind(row.sector2_session_time_seconds)
        .bind(row.sector3_session_time_seconds)
        .bind(row.pit_in_time_seconds)
        .bind(row.pit_out_time_seconds)
        .bind(row.pit_duration_seconds)
        .bind(row.stint)
        .bind(row.speed_i1)
        .bind(row.speed_i2)
        .bind(row.speed_fl)
        .bind(row.speed_st)
        .bind(&row.compound)
        .bind(row.tyre_life)
        .bind(row.fresh_tyre)
        .bind(row.position)
        .bind(&row.track_status)
        .bind(row.is_personal_best)
        .bind(row.is_accurate)
        .bind(row.deleted)
        .bind(&row.deleted_reason)
        .execute(&mut *tx)
        .await
        .with_context(|| {
            format!(
                "Failed to insert lap {} for driver {}",
                row.lap_number, row.driver_code
            )
        })?;

        inserted += 1;
    }

    tx.commit().await.context("Failed to commit laps")?;

    if dropped > 0 {
        debug!(session_id, dropped, "Dropped laps without lap number or driver");
    }

    info!(session_id, inserted, "Ingested laps");

    Ok(inserted)
}

/// Transform the upstream lap slice, dropping unidentifiable rows
pub(crate) fn build_lap_rows(laps: &[RawLap]) -> (Vec<LapRow>, usize) {
    let mut rows = Vec::with_capacity(laps.len());
    let mut dropped = 0;

    for raw in laps {
        let (Some(code), Some(lap_number)) = (raw.driver_code.as_deref(), as_int(raw.lap_number))
        else {
            dropped += 1;
            continue;
        };

        rows.push(LapRow {
            driver_code: code.to_string(),
            lap_number,
            lap_time_seconds: raw.lap_time_seconds,
            sector1_time_seconds: raw.sector1_time_seconds,
            sector2_time_seconds: raw.sector2_time_seconds,
            sector3_time_seconds: raw.sector3_time_seconds,
            lap_start_time_seconds: raw.lap_start_time_seconds,
            sector1_session_time_seconds: raw.sector1_session_time_seconds,
            sector2_session_time_seconds: raw.sector2_session_time_seconds,
            sector3_session_time_seconds: raw.sector3_session_time_seconds,
            pit_in_time_seconds: raw.pit_in_time_seconds,
            pit_out_time_seconds: raw.pit_out_time_seconds,
            pit_duration_seconds: pit_duration(raw.pit_in_time_seconds, raw.pit_out_time_seconds),
            stint: as_int(raw.stint),
            speed_i1: raw.speed_i1,
            speed_i2: raw.speed_i2,
            speed_fl: raw.speed_fl,
            speed_st: raw.speed_st,
            compound: raw.compound.clone(),
            tyre_life: as_int(raw.tyre_life),
            fresh_tyre: raw.fresh_tyre,
            position: as_int(raw.position),
            track_status: raw.track_status.clone(),
            is_personal_best: raw.is_personal_best,
            is_accurate: raw.is_accurate,
            deleted: raw.deleted,
            deleted_reason: raw.deleted_reason.clone(),
            driver_number: raw.driver_number,
        });
    }

    (rows, dropped)
}

/// Pit-stop duration from the two endpoints; null when either is missing.
///
/// Timing feeds resolve to milliseconds, so the difference is rounded back
/// to that resolution.
pub(crate) fn pit_duration(pit_in: Option<f64>, pit_out: Option<f64>) -> Option<f64> {
    match (pit_in, pit_out) {
        (Some(entry), Some(exit)) => Some(((exit - entry) * 1_000.0).round() / 1_000.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pit_duration_from_endpoints() {
        assert_eq!(pit_duration(Some(120.4), Some(145.9)), Some(25.5));
    }

    #[test]
    fn test_pit_duration_null_when_endpoint_missing() {
        assert_eq!(pit_duration(Some(120.4), None), None);
        assert_eq!(pit_duration(None, Some(145.9)), None);
        assert_eq!(pit_duration(None, None), None);
    }

    #[test]
    fn test_build_lap_rows_drops_rows_without_lap_number() {
        let laps = vec![
            RawLap {
                driver_code: Some("VER".to_string()),
                lap_number: Some(1.0),
                lap_time_seconds: Some(95.2),
                ..RawLap::default()
            },
            RawLap {
                driver_code: Some("VER".to_string()),
                lap_number: None,
                lap_time_seconds: Some(94.8),
                ..RawLap::default()
            },
            RawLap {
                driver_code: None,
                lap_number: Some(2.0),
                ..RawLap::default()
            },
        ];

        let (rows, dropped) = build_lap_rows(&laps);
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 2);
        assert_eq!(rows[0].lap_number, 1);
    }

    #[test]
    fn test_build_lap_rows_computes_pit_duration() {
        let laps = vec![RawLap {
            driver_code: Some("NOR".to_string()),
            lap_number: Some(14.0),
            pit_in_time_seconds: Some(1_200.0),
            pit_out_time_seconds: Some(1_222.75),
            ..RawLap::default()
        }];

        let (rows, _) = build_lap_rows(&laps);
        assert_eq!(rows[0].pit_duration_seconds, Some(22.75));
    }
}
