//! Weather ingester
//!
//! One row per upstream sample, roughly one a minute. The weather feed ships
//! elapsed timestamps as duration strings; samples whose timestamp cannot be
//! parsed have no place on the session timeline and are dropped.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{debug, info};

use super::{as_int, Category};
use crate::provider::models::{RawWeatherSample, SessionBundle};
use crate::provider::time::parse_elapsed;
use crate::store::inventory::category_present;

/// Typed weather row ready for insertion
#[derive(Debug, PartialEq)]
pub(crate) struct WeatherRow {
    pub session_time_seconds: f64,
    pub air_temp: Option<f64>,
    pub track_temp: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i32>,
    pub rainfall: Option<bool>,
}

/// Ingest the weather slice for one session, returning rows inserted
pub async fn ingest(pool: &PgPool, bundle: &SessionBundle, session_id: i32) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    if category_present(&mut *tx, session_id, Category::Weather).await? {
        debug!(session_id, "Weather already present, skipping");
        return Ok(0);
    }

    let (rows, dropped) = build_weather_rows(&bundle.weather);

    let mut inserted = 0u64;

    for row in &rows {
        sqlx::query(
            r#"
            INSERT INTO weather_data (
                session_id, session_time_seconds, air_temp, track_temp,
                humidity, pressure, wind_speed, wind_direction, rainfall
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session_id)
        .bind(row.session_time_seconds)
        .bind(row.air_temp)
        .bind(row.track_temp)
        .bind(row.humidity)
        .bind(row.pressure)
        .bind(row.wind_speed)
        .bind(row.wind_direction)
        .bind(row.rainfall)
        .execute(&mut *tx)
        .await
        .context("Failed to insert weather sample")?;

        inserted += 1;
    }

    tx.commit().await.context("Failed to commit weather")?;

    if dropped > 0 {
        debug!(session_id, dropped, "Dropped weather samples with unparseable timestamps");
    }

    info!(session_id, inserted, "Ingested weather");

    Ok(inserted)
}

/// Transform the upstream weather slice, dropping unparseable timestamps
pub(crate) fn build_weather_rows(samples: &[RawWeatherSample]) -> (Vec<WeatherRow>, usize) {
    let mut rows = Vec::with_capacity(samples.len());
    let mut dropped = 0;

    for raw in samples {
        let Some(time) = raw.time.as_deref().and_then(parse_elapsed) else {
            dropped += 1;
            continue;
        };

        rows.push(WeatherRow {
            session_time_seconds: time,
            air_temp: raw.air_temp,
            track_temp: raw.track_temp,
            humidity: raw.humidity,
            pressure: raw.pressure,
            wind_speed: raw.wind_speed,
            wind_direction: as_int(raw.wind_direction),
            rainfall: raw.rainfall,
        });
    }

    (rows, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: Option<&str>) -> RawWeatherSample {
        RawWeatherSample {
            time: time.map(String::from),
            air_temp: Some(28.5),
            track_temp: Some(41.0),
            ..RawWeatherSample::default()
        }
    }

    #[test]
    fn test_build_weather_rows_parses_elapsed_timestamps() {
        let (rows, dropped) = build_weather_rows(&[sample(Some("0 days 00:12:00.500000"))]);
        assert_eq!(dropped, 0);
        assert_eq!(rows[0].session_time_seconds, 720.5);
        assert_eq!(rows[0].air_temp, Some(28.5));
    }

    #[test]
    fn test_build_weather_rows_drops_unparseable_timestamps() {
        let samples = vec![
            sample(Some("00:01:00")),
            sample(Some("around noon")),
            sample(None),
        ];

        let (rows, dropped) = build_weather_rows(&samples);
        assert_eq!(rows.len(), 1);
        assert_eq!(dropped, 2);
    }
}
