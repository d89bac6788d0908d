//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::response::ErrorResponse;

/// Errors surfaced by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Requested entity does not exist
    NotFound(String),
    /// Underlying storage failure
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("not_found", message),
            ),
            ApiError::Database(err) => {
                error!(error = %err, "Database error while serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal_error", "internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
