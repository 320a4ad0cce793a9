//! Workspace roles and their assignment to members

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use shiftdesk_db::entities::{member_role, shift, workspace_member, workspace_role};
use tracing::info;
use uuid::Uuid;

use crate::authz::authorize;
use crate::capability::Capability;
use crate::error::{ScheduleError, ScheduleResult};
use crate::validation;
use crate::workspaces::find_workspace;

/// Input for [`create_role`]
#[derive(Debug, Clone, Default)]
pub struct NewRole {
    pub name: Option<String>,
    pub pay_rate: Option<Decimal>,
}

/// Partial role update
///
/// `pay_rate: Some(None)` clears the rate; `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct RolePatch {
    pub name: Option<String>,
    pub pay_rate: Option<Option<Decimal>>,
}

pub async fn create_role(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    input: NewRole,
) -> ScheduleResult<workspace_role::Model> {
    let name = validation::name_or_default(input.name.as_deref(), validation::DEFAULT_ROLE_NAME)?;
    let pay_rate = validation::pay_rate(input.pay_rate)?;

    let txn = db.begin().await?;
    find_workspace(&txn, workspace_id).await?;
    authorize(&txn, actor, workspace_id, Capability::ManageRoles).await?;

    let now = Utc::now();
    let role = workspace_role::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(workspace_id),
        name: Set(name),
        pay_rate: Set(pay_rate),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Created role {} ('{}') in workspace {}",
        role.id, role.name, workspace_id
    );
    Ok(role)
}

pub async fn modify_role(
    db: &DatabaseConnection,
    actor: Uuid,
    role_id: Uuid,
    patch: RolePatch,
) -> ScheduleResult<workspace_role::Model> {
    let name = patch
        .name
        .as_deref()
        .map(validation::name_field)
        .transpose()?;
    let pay_rate = patch.pay_rate.map(validation::pay_rate).transpose()?;

    let txn = db.begin().await?;
    let role = find_role(&txn, role_id).await?;
    authorize(&txn, actor, role.workspace_id, Capability::ManageRoles).await?;

    let mut active: workspace_role::ActiveModel = role.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(pay_rate) = pay_rate {
        active.pay_rate = Set(pay_rate);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Delete a role together with its assignments and the shifts staffed under it
pub async fn delete_role(db: &DatabaseConnection, actor: Uuid, role_id: Uuid) -> ScheduleResult<()> {
    let txn = db.begin().await?;
    let role = find_role(&txn, role_id).await?;
    authorize(&txn, actor, role.workspace_id, Capability::ManageRoles).await?;

    let assignment_ids: Vec<Uuid> = member_role::Entity::find()
        .filter(member_role::Column::WorkspaceRoleId.eq(role_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();

    if !assignment_ids.is_empty() {
        member_role::Entity::delete_many()
            .filter(member_role::Column::Id.is_in(assignment_ids.clone()))
            .exec(&txn)
            .await?;
    }

    let shifts = shift::Entity::delete_many()
        .filter(shift::Column::RoleId.eq(role_id))
        .exec(&txn)
        .await?;

    workspace_role::Entity::delete_by_id(role_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Deleted role {} ({} assignments, {} shifts)",
        role_id,
        assignment_ids.len(),
        shifts.rows_affected
    );
    Ok(())
}

pub async fn list_roles(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<Vec<workspace_role::Model>> {
    find_workspace(db, workspace_id).await?;
    authorize(db, actor, workspace_id, Capability::ManageRoles).await?;

    Ok(workspace_role::Entity::find()
        .filter(workspace_role::Column::WorkspaceId.eq(workspace_id))
        .order_by_asc(workspace_role::Column::Name)
        .all(db)
        .await?)
}

/// Give a member a role of its own workspace
pub async fn add_member_role(
    db: &DatabaseConnection,
    actor: Uuid,
    member_id: Uuid,
    role_id: Uuid,
) -> ScheduleResult<member_role::Model> {
    let txn = db.begin().await?;
    let member = find_member(&txn, member_id).await?;
    authorize(&txn, actor, member.workspace_id, Capability::ManageRoles).await?;

    let role = find_role(&txn, role_id).await?;
    if role.workspace_id != member.workspace_id {
        return Err(ScheduleError::not_found(
            "Role does not belong to this member's workspace.",
        ));
    }

    if find_assignment(&txn, member_id, role_id).await?.is_some() {
        return Err(ScheduleError::conflict("Member already has this role."));
    }

    let assignment = member_role::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_role_id: Set(role_id),
        member_id: Set(member_id),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await
    .map_err(|e| ScheduleError::from_insert(e, "Member already has this role."))?;

    txn.commit().await?;

    info!("Assigned role {} to member {}", role_id, member_id);
    Ok(assignment)
}

pub async fn remove_member_role(
    db: &DatabaseConnection,
    actor: Uuid,
    member_id: Uuid,
    role_id: Uuid,
) -> ScheduleResult<()> {
    let txn = db.begin().await?;
    let member = find_member(&txn, member_id).await?;
    authorize(&txn, actor, member.workspace_id, Capability::ManageRoles).await?;

    let assignment = find_assignment(&txn, member_id, role_id)
        .await?
        .ok_or_else(|| ScheduleError::not_found("Member does not have this role."))?;

    member_role::Entity::delete_by_id(assignment.id)
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!("Unassigned role {} from member {}", role_id, member_id);
    Ok(())
}

/// Roles currently held by a member
pub async fn list_member_roles(
    db: &DatabaseConnection,
    actor: Uuid,
    member_id: Uuid,
) -> ScheduleResult<Vec<workspace_role::Model>> {
    let member = find_member(db, member_id).await?;
    authorize(db, actor, member.workspace_id, Capability::ManageRoles).await?;

    let role_ids: Vec<Uuid> = member_role::Entity::find()
        .filter(member_role::Column::MemberId.eq(member_id))
        .all(db)
        .await?
        .into_iter()
        .map(|a| a.workspace_role_id)
        .collect();

    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(workspace_role::Entity::find()
        .filter(workspace_role::Column::Id.is_in(role_ids))
        .order_by_asc(workspace_role::Column::Name)
        .all(db)
        .await?)
}

pub(crate) async fn find_role<C: ConnectionTrait>(
    db: &C,
    role_id: Uuid,
) -> ScheduleResult<workspace_role::Model> {
    workspace_role::Entity::find_by_id(role_id)
        .one(db)
        .await?
        .ok_or_else(|| ScheduleError::not_found("Role does not exist."))
}

async fn find_member<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
) -> ScheduleResult<workspace_member::Model> {
    workspace_member::Entity::find_by_id(member_id)
        .one(db)
        .await?
        .ok_or_else(|| ScheduleError::not_found("Member does not exist."))
}

async fn find_assignment<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
    role_id: Uuid,
) -> ScheduleResult<Option<member_role::Model>> {
    Ok(member_role::Entity::find()
        .filter(member_role::Column::MemberId.eq(member_id))
        .filter(member_role::Column::WorkspaceRoleId.eq(role_id))
        .one(db)
        .await?)
}
