//! Session row creation
//!
//! Sessions are keyed by (year, round, kind) and created exactly once, after
//! a successful upstream fetch. Rows are never mutated afterwards; category
//! data hangs off the id returned here.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;

use pitwall_common::SessionKind;

/// Fields for a new session row
#[derive(Debug)]
pub struct NewSession<'a> {
    pub year: i32,
    pub round: i32,
    pub kind: SessionKind,
    pub event_name: &'a str,
    pub date: NaiveDate,
    pub circuit_id: i32,
}

/// Create the session row if absent, returning its id either way
pub async fn find_or_create(pool: &PgPool, session: &NewSession<'_>) -> Result<i32> {
    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM sessions WHERE year = $1 AND round = $2 AND session_kind = $3",
    )
    .bind(session.year)
    .bind(session.round)
    .bind(session.kind.as_str())
    .fetch_optional(pool)
    .await
    .context("Failed to look up session row")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO sessions (year, round, session_kind, event_name, date, circuit_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(session.year)
    .bind(session.round)
    .bind(session.kind.as_str())
    .bind(session.event_name)
    .bind(session.date)
    .bind(session.circuit_id)
    .fetch_one(pool)
    .await
    .with_context(|| {
        format!(
            "Failed to create session {} round {} {}",
            session.year, session.round, session.kind
        )
    })?;

    tracing::debug!(
        session_id = id,
        year = session.year,
        round = session.round,
        kind = %session.kind,
        "Created session"
    );

    Ok(id)
}
