//! Workspace endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use shiftdesk_core::workspaces;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{missing_field, schedule_error, ApiResult};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// List workspaces the caller belongs to
#[utoipa::path(
    get,
    path = "/api/workspaces",
    responses(
        (status = 200, description = "Caller's workspaces", body = WorkspaceList),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
pub async fn list_workspaces(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<WorkspaceList>> {
    debug!("Listing workspaces for {}", auth_user.user_id);

    let workspaces: Vec<Workspace> = workspaces::list_workspaces(&state.db, auth_user.user_id)
        .await
        .map_err(schedule_error)?
        .into_iter()
        .map(Workspace::from)
        .collect();
    let total = workspaces.len();

    Ok(Json(WorkspaceList { workspaces, total }))
}

/// Create a workspace owned by the caller
#[utoipa::path(
    post,
    path = "/api/workspaces",
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 201, description = "Workspace created", body = Workspace),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
pub async fn create_workspace(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<Workspace>)> {
    let workspace = workspaces::create_workspace(&state.db, auth_user.user_id, req.name)
        .await
        .map_err(schedule_error)?;

    Ok((StatusCode::CREATED, Json(workspace.into())))
}

/// Get a workspace
#[utoipa::path(
    get,
    path = "/api/workspaces/{id}",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    responses(
        (status = 200, description = "Workspace", body = Workspace),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
pub async fn get_workspace(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Workspace>> {
    let workspace = workspaces::get_workspace(&state.db, auth_user.user_id, id)
        .await
        .map_err(schedule_error)?;

    Ok(Json(workspace.into()))
}

/// Rename a workspace (owner only)
#[utoipa::path(
    patch,
    path = "/api/workspaces/{id}",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    request_body = UpdateWorkspaceRequest,
    responses(
        (status = 200, description = "Workspace updated", body = Workspace),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
pub async fn update_workspace(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWorkspaceRequest>,
) -> ApiResult<Json<Workspace>> {
    let name = req.name.ok_or_else(|| missing_field("name"))?;

    let workspace = workspaces::rename_workspace(&state.db, auth_user.user_id, id, &name)
        .await
        .map_err(schedule_error)?;

    Ok(Json(workspace.into()))
}

/// Delete a workspace and everything in it (owner only)
#[utoipa::path(
    delete,
    path = "/api/workspaces/{id}",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    responses(
        (status = 204, description = "Workspace deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
pub async fn delete_workspace(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    workspaces::delete_workspace(&state.db, auth_user.user_id, id)
        .await
        .map_err(schedule_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Transfer ownership to another member
#[utoipa::path(
    post,
    path = "/api/workspaces/{id}/transfer-owner",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    request_body = TransferOwnerRequest,
    responses(
        (status = 200, description = "Ownership transferred", body = Workspace),
        (status = 400, description = "Missing new owner", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "New owner is not a member", body = ErrorResponse),
        (status = 409, description = "Transfer to self", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
pub async fn transfer_owner(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransferOwnerRequest>,
) -> ApiResult<Json<Workspace>> {
    let new_owner = req
        .new_owner_user_id
        .ok_or_else(|| missing_field("new_owner_user_id"))?;

    let workspace = workspaces::transfer_owner(&state.db, auth_user.user_id, id, new_owner)
        .await
        .map_err(schedule_error)?;

    Ok(Json(workspace.into()))
}
