//! Driver and team upsert
//!
//! Participants are created on first sighting and never updated afterwards:
//! later sessions routinely carry thinner participant records, and letting
//! them overwrite identity fields would churn nulls into good data.
//! First-write-wins is the policy, not an accident.
//!
//! Drivers are keyed by short code across all years; teams by (year, name)
//! because names and colors shift season to season.

use anyhow::{Context, Result};
use sqlx::{PgConnection, Postgres, Transaction};

/// Identity fields for a driver sighting
#[derive(Debug, Default)]
pub struct DriverSighting<'a> {
    pub code: &'a str,
    pub full_name: Option<&'a str>,
    pub driver_number: Option<i32>,
    pub country_code: Option<&'a str>,
    pub headshot_url: Option<&'a str>,
}

/// Look up a driver by code, creating the row on first sighting.
///
/// Existing rows are returned untouched regardless of what this sighting
/// carries.
pub async fn ensure_driver(
    tx: &mut Transaction<'_, Postgres>,
    sighting: &DriverSighting<'_>,
) -> Result<i32> {
    let conn: &mut PgConnection = tx;

    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM drivers WHERE code = $1")
        .bind(sighting.code)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to look up driver")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO drivers (code, full_name, driver_number, country_code, headshot_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(sighting.code)
    .bind(sighting.full_name.unwrap_or(sighting.code))
    .bind(sighting.driver_number)
    .bind(sighting.country_code)
    .bind(sighting.headshot_url)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("Failed to create driver {}", sighting.code))?;

    tracing::debug!(driver_id = id, code = %sighting.code, "Created driver");

    Ok(id)
}

/// Look up a team by (year, name), creating the row on first sighting
pub async fn ensure_team(
    tx: &mut Transaction<'_, Postgres>,
    year: i32,
    name: &str,
    color: Option<&str>,
) -> Result<i32> {
    let conn: &mut PgConnection = tx;

    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM teams WHERE year = $1 AND name = $2")
        .bind(year)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to look up team")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO teams (year, name, color)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(year)
    .bind(name)
    .bind(color.map(normalize_team_color))
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("Failed to create team {} ({})", name, year))?;

    tracing::debug!(team_id = id, team = %name, year, "Created team");

    Ok(id)
}

/// Strip the leading marker character some feeds prefix colors with
pub fn normalize_team_color(raw: &str) -> String {
    raw.strip_prefix('#').unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_team_color_strips_marker() {
        assert_eq!(normalize_team_color("#1E41FF"), "1E41FF");
        assert_eq!(normalize_team_color("1E41FF"), "1E41FF");
    }

    #[test]
    fn test_normalize_team_color_strips_single_marker_only() {
        assert_eq!(normalize_team_color("##00D2BE"), "#00D2BE");
    }
}
