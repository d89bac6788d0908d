//! Read API routes
//!
//! Thin read-only endpoints over the telemetry schema: plain queries and
//! response shaping, no business logic.

pub mod drivers;
pub mod sessions;

use axum::routing::get;
use axum::Router;
use sqlx::PgPool;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

/// Build the /api/v1 router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sessions", get(sessions::list_sessions))
        .route("/sessions/:id/results", get(sessions::session_results))
        .route("/sessions/:id/laps", get(sessions::session_laps))
        .route("/drivers", get(drivers::list_drivers))
        .route("/drivers/:code", get(drivers::get_driver))
        .with_state(state)
}
