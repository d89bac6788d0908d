//! Driver endpoints

use axum::extract::{Path, State};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::AppState;

/// One driver row
#[derive(Debug, Serialize, FromRow)]
pub struct DriverEntry {
    pub id: i32,
    pub code: String,
    pub full_name: String,
    pub driver_number: Option<i32>,
    pub country_code: Option<String>,
    pub headshot_url: Option<String>,
}

/// GET /api/v1/drivers
pub async fn list_drivers(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<DriverEntry>>, ApiError> {
    let drivers = sqlx::query_as::<_, DriverEntry>(
        r#"
        SELECT id, code, full_name, driver_number, country_code, headshot_url
        FROM drivers
        ORDER BY code
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let count = drivers.len();
    Ok(ApiResponse::success_with_meta(
        drivers,
        serde_json::json!({ "count": count }),
    ))
}

/// GET /api/v1/drivers/:code
pub async fn get_driver(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ApiResponse<DriverEntry>, ApiError> {
    let driver = sqlx::query_as::<_, DriverEntry>(
        r#"
        SELECT id, code, full_name, driver_number, country_code, headshot_url
        FROM drivers
        WHERE code = $1
        "#,
    )
    .bind(code.to_uppercase())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("driver {} not found", code)))?;

    Ok(ApiResponse::success(driver))
}
