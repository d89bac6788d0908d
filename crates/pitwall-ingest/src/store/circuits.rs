//! Circuit lookup and creation
//!
//! Circuits are keyed by name and created on first sighting. Geometry stays
//! null when the schedule does not carry coordinates; later sessions at the
//! same venue reuse the existing row unchanged.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::provider::models::RawScheduleEvent;

/// Find the circuit for a schedule event, creating it if absent
pub async fn find_or_create(pool: &PgPool, event: &RawScheduleEvent) -> Result<i32> {
    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM circuits WHERE name = $1")
        .bind(&event.event_name)
        .fetch_optional(pool)
        .await
        .context("Failed to look up circuit")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO circuits (name, location, country, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&event.event_name)
    .bind(&event.location)
    .bind(&event.country)
    .bind(event.latitude)
    .bind(event.longitude)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Failed to create circuit {}", event.event_name))?;

    tracing::debug!(circuit_id = id, name = %event.event_name, "Created circuit");

    Ok(id)
}
