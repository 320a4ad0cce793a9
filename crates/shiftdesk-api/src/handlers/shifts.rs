//! Shift endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use shiftdesk_core::{shifts, NewShift, ShiftFilter, ShiftPatch};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{missing_field, schedule_error, ApiResult};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// List shifts visible to the caller
#[utoipa::path(
    get,
    path = "/api/shifts",
    params(
        ("shift_id" = Option<Uuid>, Query, description = "Filter by shift ID"),
        ("workspace_id" = Option<Uuid>, Query, description = "Filter by workspace (caller must be a member)"),
        ("member_id" = Option<Uuid>, Query, description = "Filter by assigned member"),
        ("role_id" = Option<Uuid>, Query, description = "Filter by role"),
        ("open" = Option<bool>, Query, description = "Only open (true) or assigned (false) shifts"),
        ("created_by_id" = Option<Uuid>, Query, description = "Filter by creating member"),
        ("range_start" = Option<String>, Query, description = "First start date, YYYY-MM-DD (inclusive)"),
        ("range_end" = Option<String>, Query, description = "Last start date, YYYY-MM-DD (inclusive)")
    ),
    responses(
        (status = 200, description = "Matching shifts ordered by start time", body = ShiftList),
        (status = 403, description = "Not a member of the filtered workspace", body = ErrorResponse)
    ),
    tag = "shifts"
)]
pub async fn list_shifts(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ShiftQuery>,
) -> ApiResult<Json<ShiftList>> {
    debug!("Listing shifts with filters: {:?}", query);

    let filter = ShiftFilter::from(query);
    let shifts: Vec<Shift> = shifts::list_shifts(&state.db, auth_user.user_id, &filter)
        .await
        .map_err(schedule_error)?
        .into_iter()
        .map(Shift::from)
        .collect();
    let total = shifts.len();

    Ok(Json(ShiftList { shifts, total }))
}

/// Schedule a shift (`manage_schedules`)
#[utoipa::path(
    post,
    path = "/api/shifts",
    request_body = CreateShiftRequest,
    responses(
        (status = 201, description = "Shift created", body = Shift),
        (status = 400, description = "Missing field or start after end", body = ErrorResponse),
        (status = 403, description = "Missing manage_schedules", body = ErrorResponse),
        (status = 404, description = "Workspace, role or member not found", body = ErrorResponse)
    ),
    tag = "shifts"
)]
pub async fn create_shift(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateShiftRequest>,
) -> ApiResult<(StatusCode, Json<Shift>)> {
    let input = NewShift {
        workspace_id: req.workspace_id.ok_or_else(|| missing_field("workspace_id"))?,
        role_id: req.role_id.ok_or_else(|| missing_field("role_id"))?,
        start_time: req.start_time.ok_or_else(|| missing_field("start_time"))?,
        end_time: req.end_time.ok_or_else(|| missing_field("end_time"))?,
        member_id: req.member_id,
    };

    let shift = shifts::create_shift(&state.db, auth_user.user_id, input)
        .await
        .map_err(schedule_error)?;

    Ok((StatusCode::CREATED, Json(shift.into())))
}

/// Get a shift
#[utoipa::path(
    get,
    path = "/api/shifts/{id}",
    params(
        ("id" = Uuid, Path, description = "Shift ID")
    ),
    responses(
        (status = 200, description = "Shift", body = Shift),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Shift not found", body = ErrorResponse)
    ),
    tag = "shifts"
)]
pub async fn get_shift(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Shift>> {
    let shift = shifts::get_shift(&state.db, auth_user.user_id, id)
        .await
        .map_err(schedule_error)?;

    Ok(Json(shift.into()))
}

/// Move, re-role or assign a shift (`manage_schedules`)
#[utoipa::path(
    patch,
    path = "/api/shifts/{id}",
    params(
        ("id" = Uuid, Path, description = "Shift ID")
    ),
    request_body = UpdateShiftRequest,
    responses(
        (status = 200, description = "Shift updated", body = Shift),
        (status = 400, description = "Start after end", body = ErrorResponse),
        (status = 403, description = "Missing manage_schedules", body = ErrorResponse),
        (status = 404, description = "Shift, role or member not found", body = ErrorResponse)
    ),
    tag = "shifts"
)]
pub async fn update_shift(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateShiftRequest>,
) -> ApiResult<Json<Shift>> {
    let patch = ShiftPatch {
        start_time: req.start_time,
        end_time: req.end_time,
        role_id: req.role_id,
        member_id: req.member_id,
    };

    let shift = shifts::modify_shift(&state.db, auth_user.user_id, id, patch)
        .await
        .map_err(schedule_error)?;

    Ok(Json(shift.into()))
}

/// Delete a shift (`manage_schedules`)
#[utoipa::path(
    delete,
    path = "/api/shifts/{id}",
    params(
        ("id" = Uuid, Path, description = "Shift ID")
    ),
    responses(
        (status = 204, description = "Shift deleted"),
        (status = 403, description = "Missing manage_schedules", body = ErrorResponse),
        (status = 404, description = "Shift not found", body = ErrorResponse)
    ),
    tag = "shifts"
)]
pub async fn delete_shift(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    shifts::delete_shift(&state.db, auth_user.user_id, id)
        .await
        .map_err(schedule_error)?;

    Ok(StatusCode::NO_CONTENT)
}
