//! Membership registry: workspaces, members and ownership transfer

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use shiftdesk_db::entities::{
    member_permissions, member_role, shift, user, workspace, workspace_member, workspace_role,
};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::authz::{
    authorize, ensure_permissions, find_membership, load_capabilities, permissions_row,
    require_member, require_owner, Membership,
};
use crate::capability::{Capabilities, Capability};
use crate::error::{ScheduleError, ScheduleResult};
use crate::validation;

/// Create a workspace owned by `creator`
///
/// The creator's membership and its owner permission row (every capability
/// set) are written in the same transaction as the workspace itself.
pub async fn create_workspace(
    db: &DatabaseConnection,
    creator: Uuid,
    name: Option<String>,
) -> ScheduleResult<workspace::Model> {
    let name = validation::name_or_default(name.as_deref(), validation::DEFAULT_WORKSPACE_NAME)?;

    let txn = db.begin().await?;

    user::Entity::find_by_id(creator)
        .one(&txn)
        .await?
        .ok_or_else(|| ScheduleError::not_found("User does not exist."))?;

    let now = Utc::now();
    let workspace = workspace::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        owner_id: Set(creator),
        created_by_id: Set(creator),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let member = membership_row(workspace.id, creator, creator, None)
        .insert(&txn)
        .await?;

    permissions_row(workspace.id, member.id, Capabilities::owner())
        .insert(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Created workspace {} ('{}') owned by {}",
        workspace.id, workspace.name, creator
    );
    Ok(workspace)
}

/// Fetch a workspace the caller belongs to
pub async fn get_workspace(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<workspace::Model> {
    let workspace = find_workspace(db, workspace_id).await?;
    require_member(db, actor, workspace_id).await?;

    Ok(workspace)
}

/// Workspaces the caller is a member of, oldest first
pub async fn list_workspaces(
    db: &DatabaseConnection,
    actor: Uuid,
) -> ScheduleResult<Vec<workspace::Model>> {
    debug!("Listing workspaces for user {}", actor);

    let workspace_ids: Vec<Uuid> = workspace_member::Entity::find()
        .filter(workspace_member::Column::UserId.eq(actor))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.workspace_id)
        .collect();

    if workspace_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(workspace::Entity::find()
        .filter(workspace::Column::Id.is_in(workspace_ids))
        .order_by_asc(workspace::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Rename a workspace (owner only)
pub async fn rename_workspace(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    name: &str,
) -> ScheduleResult<workspace::Model> {
    let name = validation::name_field(name)?;

    let txn = db.begin().await?;
    let workspace = find_workspace(&txn, workspace_id).await?;
    require_owner(&txn, actor, workspace_id).await?;

    let mut active: workspace::ActiveModel = workspace.into();
    active.name = Set(name);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!("Renamed workspace {} to '{}'", updated.id, updated.name);
    Ok(updated)
}

/// Delete a workspace and everything it owns (owner only)
pub async fn delete_workspace(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<()> {
    let txn = db.begin().await?;
    find_workspace(&txn, workspace_id).await?;
    require_owner(&txn, actor, workspace_id).await?;

    let role_ids: Vec<Uuid> = workspace_role::Entity::find()
        .filter(workspace_role::Column::WorkspaceId.eq(workspace_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();

    let shifts = shift::Entity::delete_many()
        .filter(shift::Column::WorkspaceId.eq(workspace_id))
        .exec(&txn)
        .await?;

    if !role_ids.is_empty() {
        member_role::Entity::delete_many()
            .filter(member_role::Column::WorkspaceRoleId.is_in(role_ids))
            .exec(&txn)
            .await?;
    }

    workspace_role::Entity::delete_many()
        .filter(workspace_role::Column::WorkspaceId.eq(workspace_id))
        .exec(&txn)
        .await?;

    member_permissions::Entity::delete_many()
        .filter(member_permissions::Column::WorkspaceId.eq(workspace_id))
        .exec(&txn)
        .await?;

    let members = workspace_member::Entity::delete_many()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .exec(&txn)
        .await?;

    workspace::Entity::delete_by_id(workspace_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Deleted workspace {} ({} members, {} shifts)",
        workspace_id, members.rows_affected, shifts.rows_affected
    );
    Ok(())
}

/// Add `user_id` to a workspace with default (all-false) permissions
///
/// Requires `manage_members`. The `(workspace, user)` unique index is the
/// authoritative duplicate guard: a concurrent add that slips past the lookup
/// still fails with `Conflict` on insert.
pub async fn add_member(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    user_id: Uuid,
    pay_rate: Option<Decimal>,
) -> ScheduleResult<workspace_member::Model> {
    let pay_rate = validation::pay_rate(pay_rate)?;

    let txn = db.begin().await?;
    find_workspace(&txn, workspace_id).await?;
    authorize(&txn, actor, workspace_id, Capability::ManageMembers).await?;

    user::Entity::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ScheduleError::not_found("User does not exist."))?;

    if find_membership(&txn, workspace_id, user_id).await?.is_some() {
        return Err(ScheduleError::conflict(
            "User is already a member of this workspace.",
        ));
    }

    let member = membership_row(workspace_id, user_id, actor, pay_rate)
        .insert(&txn)
        .await
        .map_err(|e| {
            ScheduleError::from_insert(e, "User is already a member of this workspace.")
        })?;

    permissions_row(workspace_id, member.id, Capabilities::default())
        .insert(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "User {} added user {} to workspace {}",
        actor, user_id, workspace_id
    );
    Ok(member)
}

/// Members of a workspace with their capabilities (members only)
pub async fn list_members(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<Vec<Membership>> {
    find_workspace(db, workspace_id).await?;
    require_member(db, actor, workspace_id).await?;

    let members = workspace_member::Entity::find()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .order_by_asc(workspace_member::Column::CreatedAt)
        .all(db)
        .await?;

    let mut capabilities: HashMap<Uuid, Capabilities> = member_permissions::Entity::find()
        .filter(member_permissions::Column::WorkspaceId.eq(workspace_id))
        .all(db)
        .await?
        .iter()
        .map(|row| (row.member_id, Capabilities::from(row)))
        .collect();

    Ok(members
        .into_iter()
        .map(|member| Membership {
            capabilities: capabilities.remove(&member.id).unwrap_or_default(),
            member,
        })
        .collect())
}

/// Set or clear a member's individual pay rate (`manage_members`)
///
/// `Some(None)` clears the rate; `None` leaves the member unchanged.
pub async fn update_member_pay_rate(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    member_id: Uuid,
    pay_rate: Option<Option<Decimal>>,
) -> ScheduleResult<workspace_member::Model> {
    let pay_rate = pay_rate.map(validation::pay_rate).transpose()?;

    let txn = db.begin().await?;
    authorize(&txn, actor, workspace_id, Capability::ManageMembers).await?;
    let member = find_member_in(&txn, workspace_id, member_id).await?;

    let Some(pay_rate) = pay_rate else {
        txn.commit().await?;
        return Ok(member);
    };

    let mut active: workspace_member::ActiveModel = member.into();
    active.pay_rate = Set(pay_rate);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Remove a member from a workspace
///
/// Requires `manage_members` unless the member is removing itself. The owner
/// cannot be removed. Cascades to the member's permission row, role
/// assignments and the shifts assigned to or created by the member.
pub async fn remove_member(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    member_id: Uuid,
) -> ScheduleResult<()> {
    let txn = db.begin().await?;
    find_workspace(&txn, workspace_id).await?;
    let target = find_member_in(&txn, workspace_id, member_id).await?;

    if target.user_id == actor {
        require_member(&txn, actor, workspace_id).await?;
    } else {
        authorize(&txn, actor, workspace_id, Capability::ManageMembers).await?;
    }

    if load_capabilities(&txn, target.id).await?.is_owner {
        return Err(ScheduleError::conflict(
            "The workspace owner cannot be removed; transfer ownership first.",
        ));
    }

    shift::Entity::delete_many()
        .filter(
            Condition::any()
                .add(shift::Column::MemberId.eq(target.id))
                .add(shift::Column::CreatedById.eq(target.id)),
        )
        .exec(&txn)
        .await?;

    member_role::Entity::delete_many()
        .filter(member_role::Column::MemberId.eq(target.id))
        .exec(&txn)
        .await?;

    member_permissions::Entity::delete_many()
        .filter(member_permissions::Column::MemberId.eq(target.id))
        .exec(&txn)
        .await?;

    workspace_member::Entity::delete_by_id(target.id)
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Removed member {} (user {}) from workspace {}",
        target.id, target.user_id, workspace_id
    );
    Ok(())
}

/// Hand ownership of a workspace to another member
///
/// The old owner's row loses only the owner bit; the new owner's row gains
/// the owner bit and every capability; the workspace's owner pointer moves.
/// All three writes commit together, so there is exactly one owner before and
/// after.
pub async fn transfer_owner(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    new_owner_user_id: Uuid,
) -> ScheduleResult<workspace::Model> {
    let txn = db.begin().await?;
    let workspace = find_workspace(&txn, workspace_id).await?;
    let current = require_owner(&txn, actor, workspace_id).await?;

    if new_owner_user_id == actor {
        return Err(ScheduleError::conflict("You already own this workspace."));
    }

    let next = find_membership(&txn, workspace_id, new_owner_user_id)
        .await?
        .ok_or_else(|| ScheduleError::not_found("New owner is not a member of this workspace."))?;

    let now = Utc::now();

    // Clear the old owner bit first so the single-owner index never sees two
    let mut old_row: member_permissions::ActiveModel =
        ensure_permissions(&txn, &current.member).await?.into();
    old_row.is_owner = Set(false);
    old_row.updated_at = Set(now);
    old_row.update(&txn).await?;

    let mut new_row: member_permissions::ActiveModel =
        ensure_permissions(&txn, &next).await?.into();
    new_row.is_owner = Set(true);
    new_row.manage_members = Set(true);
    new_row.manage_roles = Set(true);
    new_row.manage_schedules = Set(true);
    new_row.manage_time_off = Set(true);
    new_row.updated_at = Set(now);
    new_row.update(&txn).await?;

    let mut active: workspace::ActiveModel = workspace.into();
    active.owner_id = Set(new_owner_user_id);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!(
        "Transferred ownership of workspace {} from {} to {}",
        workspace_id, actor, new_owner_user_id
    );
    Ok(updated)
}

pub(crate) async fn find_workspace<C: ConnectionTrait>(
    db: &C,
    workspace_id: Uuid,
) -> ScheduleResult<workspace::Model> {
    workspace::Entity::find_by_id(workspace_id)
        .one(db)
        .await?
        .ok_or_else(|| ScheduleError::not_found("Workspace does not exist."))
}

/// A member by id, required to belong to `workspace_id`
pub(crate) async fn find_member_in<C: ConnectionTrait>(
    db: &C,
    workspace_id: Uuid,
    member_id: Uuid,
) -> ScheduleResult<workspace_member::Model> {
    workspace_member::Entity::find_by_id(member_id)
        .one(db)
        .await?
        .filter(|m| m.workspace_id == workspace_id)
        .ok_or_else(|| {
            ScheduleError::not_found("Member does not exist or is not part of this workspace.")
        })
}

fn membership_row(
    workspace_id: Uuid,
    user_id: Uuid,
    added_by: Uuid,
    pay_rate: Option<Decimal>,
) -> workspace_member::ActiveModel {
    let now = Utc::now();

    workspace_member::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(workspace_id),
        user_id: Set(user_id),
        added_by_id: Set(added_by),
        pay_rate: Set(pay_rate),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
