//! Reading and editing membership permissions

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use shiftdesk_db::entities::member_permissions;
use tracing::info;
use uuid::Uuid;

use crate::authz::{authorize, ensure_permissions, find_membership};
use crate::capability::{Capabilities, Capability, PermissionsPatch};
use crate::error::{ScheduleError, ScheduleResult};
use crate::workspaces::find_member_in;

/// The caller's own permission row in a workspace
///
/// A membership without a row gets one created here with every flag false.
pub async fn get_permissions(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<member_permissions::Model> {
    let txn = db.begin().await?;

    let member = find_membership(&txn, workspace_id, actor)
        .await?
        .ok_or_else(|| ScheduleError::not_found("You are not a member of this workspace."))?;
    let row = ensure_permissions(&txn, &member).await?;

    txn.commit().await?;
    Ok(row)
}

/// Change another member's capability flags (`manage_members`)
///
/// The owner's row is immutable here and the owner bit cannot be set or
/// cleared; both go through ownership transfer.
pub async fn update_permissions(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    member_id: Uuid,
    patch: PermissionsPatch,
) -> ScheduleResult<member_permissions::Model> {
    let txn = db.begin().await?;
    authorize(&txn, actor, workspace_id, Capability::ManageMembers).await?;

    let target = find_member_in(&txn, workspace_id, member_id).await?;
    let row = ensure_permissions(&txn, &target).await?;

    if row.is_owner {
        return Err(ScheduleError::conflict(
            "The owner's permissions cannot be changed.",
        ));
    }
    if patch.touches_owner() {
        return Err(ScheduleError::conflict(
            "Ownership can only change through an ownership transfer.",
        ));
    }

    let mut caps = Capabilities::from(&row);
    patch.apply(&mut caps);

    let mut active: member_permissions::ActiveModel = row.into();
    active.manage_members = Set(caps.manage_members);
    active.manage_roles = Set(caps.manage_roles);
    active.manage_schedules = Set(caps.manage_schedules);
    active.manage_time_off = Set(caps.manage_time_off);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!(
        "User {} updated permissions of member {} in workspace {}",
        actor, member_id, workspace_id
    );
    Ok(updated)
}
