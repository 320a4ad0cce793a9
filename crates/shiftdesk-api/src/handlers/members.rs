//! Membership and permission endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use shiftdesk_core::authz::load_capabilities;
use shiftdesk_core::{permissions, workspaces, Membership};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{missing_field, schedule_error, ApiResult};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// List members of a workspace with their capabilities
#[utoipa::path(
    get,
    path = "/api/workspaces/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    responses(
        (status = 200, description = "Workspace members", body = MemberList),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MemberList>> {
    debug!("Listing members of workspace {}", id);

    let members: Vec<Member> = workspaces::list_members(&state.db, auth_user.user_id, id)
        .await
        .map_err(schedule_error)?
        .into_iter()
        .map(Member::from)
        .collect();
    let total = members.len();

    Ok(Json(MemberList { members, total }))
}

/// Add a user to a workspace (`manage_members`)
#[utoipa::path(
    post,
    path = "/api/workspaces/{id}/members",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = Member),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Missing manage_members", body = ErrorResponse),
        (status = 404, description = "Workspace or user not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let user_id = req.user_id.ok_or_else(|| missing_field("user_id"))?;

    let member = workspaces::add_member(&state.db, auth_user.user_id, id, user_id, req.pay_rate)
        .await
        .map_err(schedule_error)?;

    Ok((StatusCode::CREATED, Json(member.into())))
}

/// Set or clear a member's pay rate (`manage_members`)
#[utoipa::path(
    patch,
    path = "/api/workspaces/{id}/members/{member_id}",
    params(
        ("id" = Uuid, Path, description = "Workspace ID"),
        ("member_id" = Uuid, Path, description = "Member ID")
    ),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 400, description = "Invalid pay rate", body = ErrorResponse),
        (status = 403, description = "Missing manage_members", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateMemberRequest>,
) -> ApiResult<Json<Member>> {
    let member =
        workspaces::update_member_pay_rate(&state.db, auth_user.user_id, id, member_id, req.pay_rate)
            .await
            .map_err(schedule_error)?;
    let capabilities = load_capabilities(&state.db, member.id)
        .await
        .map_err(schedule_error)?;

    let member = Member::from(Membership {
        member,
        capabilities,
    });

    Ok(Json(member))
}

/// Remove a member; members may always remove themselves
#[utoipa::path(
    delete,
    path = "/api/workspaces/{id}/members/{member_id}",
    params(
        ("id" = Uuid, Path, description = "Workspace ID"),
        ("member_id" = Uuid, Path, description = "Member ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Missing manage_members", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Member is the owner", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    workspaces::remove_member(&state.db, auth_user.user_id, id, member_id)
        .await
        .map_err(schedule_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own permissions in a workspace
#[utoipa::path(
    get,
    path = "/api/workspaces/{id}/permissions",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    responses(
        (status = 200, description = "Caller's permissions", body = Permissions),
        (status = 404, description = "Not a member", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn get_permissions(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Permissions>> {
    let row = permissions::get_permissions(&state.db, auth_user.user_id, id)
        .await
        .map_err(schedule_error)?;

    Ok(Json(row.into()))
}

/// Change a member's capabilities (`manage_members`)
#[utoipa::path(
    patch,
    path = "/api/workspaces/{id}/members/{member_id}/permissions",
    params(
        ("id" = Uuid, Path, description = "Workspace ID"),
        ("member_id" = Uuid, Path, description = "Member ID")
    ),
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Permissions updated", body = Permissions),
        (status = 403, description = "Missing manage_members", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse),
        (status = 409, description = "Owner permissions are immutable", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn update_permissions(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdatePermissionsRequest>,
) -> ApiResult<Json<Permissions>> {
    let row = permissions::update_permissions(
        &state.db,
        auth_user.user_id,
        id,
        member_id,
        req.into(),
    )
    .await
    .map_err(schedule_error)?;

    Ok(Json(row.into()))
}
