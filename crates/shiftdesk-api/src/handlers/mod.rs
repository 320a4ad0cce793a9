//! HTTP handlers
//!
//! Handlers are thin: they translate request models into core calls and core
//! results back into response models. Every authorization decision is made by
//! `shiftdesk_core`.

pub mod members;
pub mod roles;
pub mod shifts;
pub mod workspaces;

use axum::{extract::State, http::StatusCode, Json};
use shiftdesk_core::ScheduleError;
use std::sync::Arc;
use tracing::error;

use crate::models::{ErrorResponse, HealthResponse};
use crate::AppState;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: Some(code.to_string()),
        }),
    )
}

/// Map a core error onto the HTTP status taxonomy
pub(crate) fn schedule_error(err: ScheduleError) -> ApiError {
    match err {
        ScheduleError::Validation(msg) => {
            error_response(StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR")
        }
        ScheduleError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
        ScheduleError::Forbidden(msg) => error_response(StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
        ScheduleError::Conflict(msg) => error_response(StatusCode::CONFLICT, msg, "CONFLICT"),
        ScheduleError::Database(e) => {
            error!("Database error: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "DATABASE_ERROR",
            )
        }
    }
}

/// 400 for a required field the client left out
pub(crate) fn missing_field(field: &str) -> ApiError {
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Missing required field '{}'", field),
        "VALIDATION_ERROR",
    )
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = state.db.ping().await.is_ok();

    Json(HealthResponse {
        status: if database { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_taxonomy() {
        let cases = [
            (ScheduleError::validation("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ScheduleError::not_found("gone"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ScheduleError::forbidden("no"), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ScheduleError::conflict("dup"), StatusCode::CONFLICT, "CONFLICT"),
        ];

        for (err, status, code) in cases {
            let (got_status, Json(body)) = schedule_error(err);
            assert_eq!(got_status, status);
            assert_eq!(body.code.as_deref(), Some(code));
        }
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = ScheduleError::Database(sea_orm::DbErr::Custom("disk I/O error".to_string()));
        let (status, Json(body)) = schedule_error(err);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }
}
