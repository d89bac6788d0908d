//! Results ingester
//!
//! One row per classified participant. Resolves driver and team rows as a
//! side effect (first sighting creates them), computes the fastest-lap marker
//! for race-like sessions from the loaded lap set, and applies the points
//! defaulting rule for qualifying kinds.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{debug, info};

use pitwall_common::SessionKind;

use super::{as_int, Category};
use crate::provider::models::{RawLap, RawResultRow, SessionBundle};
use crate::store::inventory::category_present;
use crate::store::participants::{ensure_driver, ensure_team, DriverSighting};

/// Typed result row ready for insertion
#[derive(Debug, PartialEq)]
pub(crate) struct ResultRow {
    pub position: Option<i32>,
    pub classified_position: Option<String>,
    pub status: String,
    pub grid_position: Option<i32>,
    pub points: Option<f64>,
    pub laps_completed: Option<i32>,
    pub time_seconds: Option<f64>,
    pub fastest_lap: bool,
    pub q1_time_seconds: Option<f64>,
    pub q2_time_seconds: Option<f64>,
    pub q3_time_seconds: Option<f64>,
    pub headshot_url: Option<String>,
}

/// Ingest the results slice for one session, returning rows inserted
pub async fn ingest(
    pool: &PgPool,
    bundle: &SessionBundle,
    session_id: i32,
    year: i32,
    kind: SessionKind,
) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    if category_present(&mut *tx, session_id, Category::Results).await? {
        debug!(session_id, "Results already present, skipping");
        return Ok(0);
    }

    let fastest_driver = if kind.is_race_like() {
        fastest_lap_driver(&bundle.laps)
    } else {
        None
    };

    let mut inserted = 0u64;
    let mut dropped = 0usize;

    for raw in &bundle.results {
        let (Some(code), Some(team_name)) = (raw.driver_code.as_deref(), raw.team_name.as_deref())
        else {
            // No stable participant identity to attach the row to
            dropped += 1;
            continue;
        };

        let driver_id = ensure_driver(
            &mut tx,
            &DriverSighting {
                code,
                full_name: raw.full_name.as_deref(),
                driver_number: raw.driver_number,
                country_code: raw.country_code.as_deref(),
                headshot_url: raw.headshot_url.as_deref(),
            },
        )
        .await?;

        let team_id = ensure_team(&mut tx, year, team_name, raw.team_color.as_deref()).await?;

        let row = build_result_row(raw, kind, fastest_driver.as_deref());

        sqlx::query(
            r#"
            INSERT INTO session_results (
                session_id, driver_id, team_id,
                position, classified_position, status, grid_position, points,
                laps_completed, time_seconds, fastest_lap,
                q1_time_seconds, q2_time_seconds, q3_time_seconds, headshot_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(session_id)
        .bind(driver_id)
        .bind(team_id)
        .bind(row.position)
        .bind(&row.classified_position)
        .bind(&row.status)
        .bind(row.grid_position)
        .bind(row.points)
        .bind(row.laps_completed)
        .bind(row.time_seconds)
        .bind(row.fastest_lap)
        .bind(row.q1_time_seconds)
        .bind(row.q2_time_seconds)
        .bind(row.q3_time_seconds)
        .bind(&row.headshot_url)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert result for driver {}", code))?;

        inserted += 1;
    }

    tx.commit().await.context("Failed to commit results")?;

    if dropped > 0 {
        debug!(session_id, dropped, "Dropped unidentifiable result rows");
    }

    info!(session_id, inserted, "Ingested results");

    Ok(inserted)
}

/// Build the typed row from an upstream record
pub(crate) fn build_result_row(
    raw: &RawResultRow,
    kind: SessionKind,
    fastest_driver: Option<&str>,
) -> ResultRow {
    let fastest_lap = kind.is_race_like()
        && raw.driver_code.as_deref().is_some()
        && raw.driver_code.as_deref() == fastest_driver;

    ResultRow {
        position: as_int(raw.position),
        classified_position: raw.classified_position.clone(),
        status: raw.status.clone().unwrap_or_else(|| "Unknown".to_string()),
        grid_position: as_int(raw.grid_position),
        points: points_for(kind, raw.points),
        laps_completed: as_int(raw.laps_completed),
        time_seconds: raw.time_seconds,
        fastest_lap,
        q1_time_seconds: raw.q1_time_seconds,
        q2_time_seconds: raw.q2_time_seconds,
        q3_time_seconds: raw.q3_time_seconds,
        headshot_url: raw.headshot_url.clone(),
    }
}

/// Points column value for a session kind.
///
/// Qualifying kinds award no points and the upstream record simply omits the
/// field, so absence means 0.0 there. For race kinds an absent value is
/// genuinely unknown and stays null.
pub(crate) fn points_for(kind: SessionKind, points: Option<f64>) -> Option<f64> {
    match points {
        Some(p) => Some(p),
        None if kind.is_qualifying_like() => Some(0.0),
        None => None,
    }
}

/// Driver code holding the fastest valid lap of the session.
///
/// Valid means a recorded lap time on a lap the stewards did not delete.
/// Ties resolve deterministically: earliest lap number first, then the
/// smaller driver code.
pub(crate) fn fastest_lap_driver(laps: &[RawLap]) -> Option<String> {
    let mut best: Option<(f64, f64, &str)> = None;

    for lap in laps {
        let (Some(code), Some(time)) = (lap.driver_code.as_deref(), lap.lap_time_seconds) else {
            continue;
        };
        if lap.deleted == Some(true) {
            continue;
        }

        let candidate = (time, lap.lap_number.unwrap_or(f64::MAX), code);
        if best.map_or(true, |current| candidate < current) {
            best = Some(candidate);
        }
    }

    best.map(|(_, _, code)| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(code: &str, number: f64, time: f64) -> RawLap {
        RawLap {
            driver_code: Some(code.to_string()),
            lap_number: Some(number),
            lap_time_seconds: Some(time),
            ..RawLap::default()
        }
    }

    #[test]
    fn test_fastest_lap_picks_minimum_time() {
        let laps = vec![lap("VER", 30.0, 92.3), lap("HAM", 31.0, 91.8), lap("LEC", 32.0, 93.0)];
        assert_eq!(fastest_lap_driver(&laps).as_deref(), Some("HAM"));
    }

    #[test]
    fn test_fastest_lap_tie_breaks_on_lap_number_then_code() {
        // Identical times: earlier lap wins
        let laps = vec![lap("VER", 40.0, 91.5), lap("HAM", 12.0, 91.5)];
        assert_eq!(fastest_lap_driver(&laps).as_deref(), Some("HAM"));

        // Identical time and lap number: smaller code wins
        let laps = vec![lap("VER", 12.0, 91.5), lap("ALO", 12.0, 91.5)];
        assert_eq!(fastest_lap_driver(&laps).as_deref(), Some("ALO"));
    }

    #[test]
    fn test_fastest_lap_skips_deleted_and_timeless_laps() {
        let mut deleted = lap("VER", 20.0, 89.0);
        deleted.deleted = Some(true);
        let mut out_lap = lap("HAM", 1.0, 0.0);
        out_lap.lap_time_seconds = None;

        let laps = vec![deleted, out_lap, lap("LEC", 33.0, 92.0)];
        assert_eq!(fastest_lap_driver(&laps).as_deref(), Some("LEC"));
    }

    #[test]
    fn test_fastest_lap_empty_set() {
        assert_eq!(fastest_lap_driver(&[]), None);
    }

    #[test]
    fn test_points_default_for_qualifying_only() {
        assert_eq!(points_for(SessionKind::Qualifying, None), Some(0.0));
        assert_eq!(points_for(SessionKind::SprintQualifying, None), Some(0.0));
        assert_eq!(points_for(SessionKind::Race, None), None);
        assert_eq!(points_for(SessionKind::Race, Some(25.0)), Some(25.0));
    }

    #[test]
    fn test_build_result_row_defaults_status() {
        let raw = RawResultRow {
            driver_code: Some("VER".to_string()),
            position: Some(1.0),
            ..RawResultRow::default()
        };
        let row = build_result_row(&raw, SessionKind::Race, Some("VER"));

        assert_eq!(row.status, "Unknown");
        assert_eq!(row.position, Some(1));
        assert!(row.fastest_lap);
        assert_eq!(row.points, None);
    }

    #[test]
    fn test_build_result_row_no_fastest_lap_for_qualifying() {
        let raw = RawResultRow {
            driver_code: Some("VER".to_string()),
            ..RawResultRow::default()
        };
        let row = build_result_row(&raw, SessionKind::Qualifying, Some("VER"));
        assert!(!row.fastest_lap);
    }
}
