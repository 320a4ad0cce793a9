//! Authorization policy
//!
//! The single gate every mutating operation passes through. Resolution order:
//!
//! 1. the actor must hold a `WorkspaceMember` row in the workspace, else
//!    `Forbidden("not a member")`;
//! 2. that membership's `MemberPermissions` row is loaded, a missing row
//!    reading as all-false and non-owner;
//! 3. the request is granted when the row is the owner's or the named
//!    capability is set.
//!
//! All functions are generic over [`ConnectionTrait`] so callers run them on
//! the same transaction as the mutation they guard.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use shiftdesk_db::entities::{member_permissions, workspace_member};
use tracing::warn;
use uuid::Uuid;

use crate::capability::{Capabilities, Capability};
use crate::error::{ScheduleError, ScheduleResult};

/// A caller's resolved membership in one workspace
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub member: workspace_member::Model,
    pub capabilities: Capabilities,
}

impl Membership {
    pub fn member_id(&self) -> Uuid {
        self.member.id
    }

    pub fn workspace_id(&self) -> Uuid {
        self.member.workspace_id
    }

    pub fn is_owner(&self) -> bool {
        self.capabilities.is_owner
    }
}

/// Grant `capability` to `actor` in `workspace_id`, or fail with `Forbidden`
pub async fn authorize<C: ConnectionTrait>(
    db: &C,
    actor: Uuid,
    workspace_id: Uuid,
    capability: Capability,
) -> ScheduleResult<Membership> {
    let membership = resolve(db, actor, workspace_id).await?;

    if membership.capabilities.allows(capability) {
        return Ok(membership);
    }

    warn!(
        "Denied {} to user {} in workspace {}",
        capability, actor, workspace_id
    );
    Err(ScheduleError::forbidden(format!(
        "You do not have the {} permission in this workspace.",
        capability
    )))
}

/// Succeeds only for the workspace owner
pub async fn require_owner<C: ConnectionTrait>(
    db: &C,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<Membership> {
    let membership = resolve(db, actor, workspace_id).await?;

    if membership.is_owner() {
        return Ok(membership);
    }

    warn!(
        "Denied owner-only operation to user {} in workspace {}",
        actor, workspace_id
    );
    Err(ScheduleError::forbidden(
        "Only the workspace owner can do this.",
    ))
}

/// Succeeds for any member of the workspace
pub async fn require_member<C: ConnectionTrait>(
    db: &C,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<Membership> {
    resolve(db, actor, workspace_id).await
}

async fn resolve<C: ConnectionTrait>(
    db: &C,
    actor: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<Membership> {
    let Some(member) = find_membership(db, workspace_id, actor).await? else {
        warn!("User {} is not a member of workspace {}", actor, workspace_id);
        return Err(ScheduleError::forbidden(
            "You are not a member of this workspace.",
        ));
    };

    let capabilities = load_capabilities(db, member.id).await?;

    Ok(Membership {
        member,
        capabilities,
    })
}

/// Look up the membership of `user_id` in `workspace_id`
pub async fn find_membership<C: ConnectionTrait>(
    db: &C,
    workspace_id: Uuid,
    user_id: Uuid,
) -> ScheduleResult<Option<workspace_member::Model>> {
    Ok(workspace_member::Entity::find()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .filter(workspace_member::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Capabilities of a membership; a missing permission row reads as default-deny
pub async fn load_capabilities<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
) -> ScheduleResult<Capabilities> {
    let row = member_permissions::Entity::find()
        .filter(member_permissions::Column::MemberId.eq(member_id))
        .one(db)
        .await?;

    Ok(row.as_ref().map(Capabilities::from).unwrap_or_default())
}

/// Get-or-create the permission row of a membership (defaults: all false)
pub async fn ensure_permissions<C: ConnectionTrait>(
    db: &C,
    member: &workspace_member::Model,
) -> ScheduleResult<member_permissions::Model> {
    let existing = member_permissions::Entity::find()
        .filter(member_permissions::Column::MemberId.eq(member.id))
        .one(db)
        .await?;

    match existing {
        Some(row) => Ok(row),
        None => Ok(
            permissions_row(member.workspace_id, member.id, Capabilities::default())
                .insert(db)
                .await?,
        ),
    }
}

/// Fresh permission row for a membership
pub(crate) fn permissions_row(
    workspace_id: Uuid,
    member_id: Uuid,
    caps: Capabilities,
) -> member_permissions::ActiveModel {
    let now = Utc::now();

    member_permissions::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(workspace_id),
        member_id: Set(member_id),
        is_owner: Set(caps.is_owner),
        manage_members: Set(caps.manage_members),
        manage_roles: Set(caps.manage_roles),
        manage_schedules: Set(caps.manage_schedules),
        manage_time_off: Set(caps.manage_time_off),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
