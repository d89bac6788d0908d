//! Session endpoints: listings, results, laps

use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::AppState;

/// Query filters for the session listing
#[derive(Debug, Deserialize)]
pub struct SessionFilter {
    pub year: Option<i32>,
    pub round: Option<i32>,
}

/// One session with its venue
#[derive(Debug, Serialize, FromRow)]
pub struct SessionSummary {
    pub id: i32,
    pub year: i32,
    pub round: i32,
    pub session_kind: String,
    pub event_name: String,
    pub date: NaiveDate,
    pub circuit_name: String,
    pub location: Option<String>,
    pub country: Option<String>,
}

/// One participant's result with driver and team resolved
#[derive(Debug, Serialize, FromRow)]
pub struct ResultEntry {
    pub position: Option<i32>,
    pub classified_position: Option<String>,
    pub status: String,
    pub driver_code: String,
    pub driver_name: String,
    pub team_name: String,
    pub grid_position: Option<i32>,
    pub points: Option<f64>,
    pub laps_completed: Option<i32>,
    pub time_seconds: Option<f64>,
    pub fastest_lap: bool,
    pub q1_time_seconds: Option<f64>,
    pub q2_time_seconds: Option<f64>,
    pub q3_time_seconds: Option<f64>,
}

/// Query filters for the lap listing
#[derive(Debug, Deserialize)]
pub struct LapFilter {
    /// Restrict to one driver by code
    pub driver: Option<String>,
}

/// One lap with its driver resolved
#[derive(Debug, Serialize, FromRow)]
pub struct LapEntry {
    pub driver_code: String,
    pub lap_number: i32,
    pub lap_time_seconds: Option<f64>,
    pub sector1_time_seconds: Option<f64>,
    pub sector2_time_seconds: Option<f64>,
    pub sector3_time_seconds: Option<f64>,
    pub pit_duration_seconds: Option<f64>,
    pub stint: Option<i32>,
    pub compound: Option<String>,
    pub position: Option<i32>,
    pub is_personal_best: Option<bool>,
    pub deleted: Option<bool>,
}

/// GET /api/v1/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> Result<ApiResponse<Vec<SessionSummary>>, ApiError> {
    let sessions = sqlx::query_as::<_, SessionSummary>(
        r#"
        SELECT s.id, s.year, s.round, s.session_kind, s.event_name, s.date,
               c.name AS circuit_name, c.location, c.country
        FROM sessions s
        JOIN circuits c ON c.id = s.circuit_id
        WHERE ($1::int IS NULL OR s.year = $1)
          AND ($2::int IS NULL OR s.round = $2)
        ORDER BY s.year, s.round, s.session_kind
        "#,
    )
    .bind(filter.year)
    .bind(filter.round)
    .fetch_all(&state.db)
    .await?;

    let count = sessions.len();
    Ok(ApiResponse::success_with_meta(
        sessions,
        serde_json::json!({ "count": count }),
    ))
}

/// GET /api/v1/sessions/:id/results
pub async fn session_results(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<ApiResponse<Vec<ResultEntry>>, ApiError> {
    ensure_session_exists(&state, session_id).await?;

    let results = sqlx::query_as::<_, ResultEntry>(
        r#"
        SELECT r.position, r.classified_position, r.status,
               d.code AS driver_code, d.full_name AS driver_name,
               t.name AS team_name,
               r.grid_position, r.points, r.laps_completed, r.time_seconds,
               r.fastest_lap, r.q1_time_seconds, r.q2_time_seconds, r.q3_time_seconds
        FROM session_results r
        JOIN drivers d ON d.id = r.driver_id
        JOIN teams t ON t.id = r.team_id
        WHERE r.session_id = $1
        ORDER BY r.position NULLS LAST, d.code
        "#,
    )
    .bind(session_id)
    .fetch_all(&state.db)
    .await?;

    Ok(ApiResponse::success(results))
}

/// GET /api/v1/sessions/:id/laps
pub async fn session_laps(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
    Query(filter): Query<LapFilter>,
) -> Result<ApiResponse<Vec<LapEntry>>, ApiError> {
    ensure_session_exists(&state, session_id).await?;

    let laps = sqlx::query_as::<_, LapEntry>(
        r#"
        SELECT d.code AS driver_code, l.lap_number, l.lap_time_seconds,
               l.sector1_time_seconds, l.sector2_time_seconds, l.sector3_time_seconds,
               l.pit_duration_seconds, l.stint, l.compound, l.position,
               l.is_personal_best, l.deleted
        FROM laps l
        JOIN drivers d ON d.id = l.driver_id
        WHERE l.session_id = $1
          AND ($2::text IS NULL OR d.code = $2)
        ORDER BY l.lap_number, d.code
        "#,
    )
    .bind(session_id)
    .bind(filter.driver)
    .fetch_all(&state.db)
    .await?;

    let count = laps.len();
    Ok(ApiResponse::success_with_meta(
        laps,
        serde_json::json!({ "count": count }),
    ))
}

async fn ensure_session_exists(state: &AppState, session_id: i32) -> Result<(), ApiError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sessions WHERE id = $1)")
        .bind(session_id)
        .fetch_one(&state.db)
        .await?;

    if !exists {
        return Err(ApiError::NotFound(format!("session {} not found", session_id)));
    }

    Ok(())
}
