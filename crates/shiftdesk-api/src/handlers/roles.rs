//! Role endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use shiftdesk_core::{roles, NewRole, RolePatch};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{schedule_error, ApiResult};
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// List roles of a workspace (`manage_roles`)
#[utoipa::path(
    get,
    path = "/api/workspaces/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    responses(
        (status = 200, description = "Workspace roles", body = RoleList),
        (status = 403, description = "Missing manage_roles", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "roles"
)]
pub async fn list_roles(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoleList>> {
    debug!("Listing roles of workspace {}", id);

    let roles: Vec<Role> = roles::list_roles(&state.db, auth_user.user_id, id)
        .await
        .map_err(schedule_error)?
        .into_iter()
        .map(Role::from)
        .collect();
    let total = roles.len();

    Ok(Json(RoleList { roles, total }))
}

/// Create a role (`manage_roles`)
#[utoipa::path(
    post,
    path = "/api/workspaces/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "Workspace ID")
    ),
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Invalid name or pay rate", body = ErrorResponse),
        (status = 403, description = "Missing manage_roles", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "roles"
)]
pub async fn create_role(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<Role>)> {
    let role = roles::create_role(
        &state.db,
        auth_user.user_id,
        id,
        NewRole {
            name: req.name,
            pay_rate: req.pay_rate,
        },
    )
    .await
    .map_err(schedule_error)?;

    Ok((StatusCode::CREATED, Json(role.into())))
}

/// Rename a role or change its pay rate (`manage_roles`)
#[utoipa::path(
    patch,
    path = "/api/roles/{role_id}",
    params(
        ("role_id" = Uuid, Path, description = "Role ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 400, description = "Invalid name or pay rate", body = ErrorResponse),
        (status = 403, description = "Missing manage_roles", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "roles"
)]
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(role_id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<Role>> {
    let role = roles::modify_role(
        &state.db,
        auth_user.user_id,
        role_id,
        RolePatch {
            name: req.name,
            pay_rate: req.pay_rate,
        },
    )
    .await
    .map_err(schedule_error)?;

    Ok(Json(role.into()))
}

/// Delete a role, its assignments and its shifts (`manage_roles`)
#[utoipa::path(
    delete,
    path = "/api/roles/{role_id}",
    params(
        ("role_id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 403, description = "Missing manage_roles", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "roles"
)]
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    roles::delete_role(&state.db, auth_user.user_id, role_id)
        .await
        .map_err(schedule_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Roles held by a member (`manage_roles`)
#[utoipa::path(
    get,
    path = "/api/members/{member_id}/roles",
    params(
        ("member_id" = Uuid, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member's roles", body = RoleList),
        (status = 403, description = "Missing manage_roles", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    ),
    tag = "roles"
)]
pub async fn list_member_roles(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(member_id): Path<Uuid>,
) -> ApiResult<Json<RoleList>> {
    let roles: Vec<Role> = roles::list_member_roles(&state.db, auth_user.user_id, member_id)
        .await
        .map_err(schedule_error)?
        .into_iter()
        .map(Role::from)
        .collect();
    let total = roles.len();

    Ok(Json(RoleList { roles, total }))
}

/// Assign a role to a member (`manage_roles`)
#[utoipa::path(
    put,
    path = "/api/members/{member_id}/roles/{role_id}",
    params(
        ("member_id" = Uuid, Path, description = "Member ID"),
        ("role_id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 201, description = "Role assigned", body = MemberRoleAssignment),
        (status = 403, description = "Missing manage_roles", body = ErrorResponse),
        (status = 404, description = "Member or role not found", body = ErrorResponse),
        (status = 409, description = "Member already has the role", body = ErrorResponse)
    ),
    tag = "roles"
)]
pub async fn add_member_role(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path((member_id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<MemberRoleAssignment>)> {
    let assignment = roles::add_member_role(&state.db, auth_user.user_id, member_id, role_id)
        .await
        .map_err(schedule_error)?;

    Ok((StatusCode::CREATED, Json(assignment.into())))
}

/// Take a role away from a member (`manage_roles`)
#[utoipa::path(
    delete,
    path = "/api/members/{member_id}/roles/{role_id}",
    params(
        ("member_id" = Uuid, Path, description = "Member ID"),
        ("role_id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role unassigned"),
        (status = 403, description = "Missing manage_roles", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "roles"
)]
pub async fn remove_member_role(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path((member_id, role_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    roles::remove_member_role(&state.db, auth_user.user_id, member_id, role_id)
        .await
        .map_err(schedule_error)?;

    Ok(StatusCode::NO_CONTENT)
}
