//! Shift engine
//!
//! A shift is either `Open` (no member, `open = true`) or `Assigned` to one
//! member (`open = false`). The `open` column is always derived from the
//! member on write, never taken from input. The only transition is
//! `Open -> Assigned` (or reassignment); nothing clears a member.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Select, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use shiftdesk_db::entities::{shift, workspace_member};
use tracing::{debug, info};
use uuid::Uuid;

use crate::authz::{authorize, require_member};
use crate::capability::Capability;
use crate::error::{ScheduleError, ScheduleResult};
use crate::roles::find_role;
use crate::workspaces::{find_member_in, find_workspace};

/// Lifecycle state of a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "member_id", rename_all = "snake_case")]
pub enum ShiftState {
    Open,
    Assigned(Uuid),
}

impl ShiftState {
    pub fn of(shift: &shift::Model) -> Self {
        Self::from(shift.member_id)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ShiftState::Open)
    }

    pub fn member_id(&self) -> Option<Uuid> {
        match self {
            ShiftState::Open => None,
            ShiftState::Assigned(member_id) => Some(*member_id),
        }
    }
}

impl From<Option<Uuid>> for ShiftState {
    fn from(member_id: Option<Uuid>) -> Self {
        match member_id {
            Some(member_id) => ShiftState::Assigned(member_id),
            None => ShiftState::Open,
        }
    }
}

/// Input for [`create_shift`]
#[derive(Debug, Clone)]
pub struct NewShift {
    pub workspace_id: Uuid,
    pub role_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub member_id: Option<Uuid>,
}

/// Partial shift update; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct ShiftPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub role_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
}

/// Conjunctive shift query; unset fields are not applied
///
/// `range_start` and `range_end` bound the shift's start date, both ends
/// inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftFilter {
    pub shift_id: Option<Uuid>,
    pub workspace_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub open: Option<bool>,
    pub created_by_id: Option<Uuid>,
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
}

impl ShiftFilter {
    fn apply(&self, mut query: Select<shift::Entity>) -> Select<shift::Entity> {
        if let Some(id) = self.shift_id {
            query = query.filter(shift::Column::Id.eq(id));
        }
        if let Some(workspace_id) = self.workspace_id {
            query = query.filter(shift::Column::WorkspaceId.eq(workspace_id));
        }
        if let Some(member_id) = self.member_id {
            query = query.filter(shift::Column::MemberId.eq(member_id));
        }
        if let Some(role_id) = self.role_id {
            query = query.filter(shift::Column::RoleId.eq(role_id));
        }
        if let Some(open) = self.open {
            query = query.filter(shift::Column::Open.eq(open));
        }
        if let Some(created_by_id) = self.created_by_id {
            query = query.filter(shift::Column::CreatedById.eq(created_by_id));
        }
        if let Some(start) = self.range_start {
            query = query.filter(shift::Column::StartTime.gte(start_of_day(start)));
        }
        // The last representable date has no successor; leave the bound open
        if let Some(next) = self.range_end.and_then(|end| end.succ_opt()) {
            query = query.filter(shift::Column::StartTime.lt(start_of_day(next)));
        }
        query
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Shifts may be zero-length but never end before they start
pub fn check_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleResult<()> {
    if start > end {
        return Err(ScheduleError::validation(
            "Shift start time must not be after its end time.",
        ));
    }
    Ok(())
}

/// Schedule a shift (`manage_schedules`)
///
/// Starts `Assigned` when a member is given, `Open` otherwise.
pub async fn create_shift(
    db: &DatabaseConnection,
    actor: Uuid,
    input: NewShift,
) -> ScheduleResult<shift::Model> {
    let txn = db.begin().await?;
    find_workspace(&txn, input.workspace_id).await?;
    let creator = authorize(&txn, actor, input.workspace_id, Capability::ManageSchedules).await?;

    role_in_workspace(&txn, input.role_id, input.workspace_id).await?;
    if let Some(member_id) = input.member_id {
        find_member_in(&txn, input.workspace_id, member_id).await?;
    }
    check_time_range(input.start_time, input.end_time)?;

    let state = ShiftState::from(input.member_id);
    let now = Utc::now();
    let shift = shift::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(input.workspace_id),
        role_id: Set(input.role_id),
        member_id: Set(state.member_id()),
        created_by_id: Set(creator.member_id()),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        open: Set(state.is_open()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Created {:?} shift {} in workspace {}",
        state, shift.id, shift.workspace_id
    );
    Ok(shift)
}

/// Apply a partial update to a shift (`manage_schedules`)
///
/// The time-range check runs on the post-patch pair, so moving only one end
/// still has to agree with the stored other end.
pub async fn modify_shift(
    db: &DatabaseConnection,
    actor: Uuid,
    shift_id: Uuid,
    patch: ShiftPatch,
) -> ScheduleResult<shift::Model> {
    let txn = db.begin().await?;
    let existing = find_shift(&txn, shift_id).await?;
    let workspace_id = existing.workspace_id;
    authorize(&txn, actor, workspace_id, Capability::ManageSchedules).await?;

    if let Some(role_id) = patch.role_id {
        role_in_workspace(&txn, role_id, workspace_id).await?;
    }
    if let Some(member_id) = patch.member_id {
        find_member_in(&txn, workspace_id, member_id).await?;
    }

    let start_time = patch.start_time.unwrap_or(existing.start_time);
    let end_time = patch.end_time.unwrap_or(existing.end_time);
    check_time_range(start_time, end_time)?;

    let state = ShiftState::from(patch.member_id.or(existing.member_id));

    let mut active: shift::ActiveModel = existing.into();
    active.start_time = Set(start_time);
    active.end_time = Set(end_time);
    if let Some(role_id) = patch.role_id {
        active.role_id = Set(role_id);
    }
    active.member_id = Set(state.member_id());
    active.open = Set(state.is_open());
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    debug!("Modified shift {} ({:?})", shift_id, state);
    Ok(updated)
}

pub async fn delete_shift(
    db: &DatabaseConnection,
    actor: Uuid,
    shift_id: Uuid,
) -> ScheduleResult<()> {
    let txn = db.begin().await?;
    let existing = find_shift(&txn, shift_id).await?;
    authorize(&txn, actor, existing.workspace_id, Capability::ManageSchedules).await?;

    shift::Entity::delete_by_id(shift_id).exec(&txn).await?;
    txn.commit().await?;

    info!("Deleted shift {}", shift_id);
    Ok(())
}

/// A single shift, visible to any member of its workspace
pub async fn get_shift(
    db: &DatabaseConnection,
    actor: Uuid,
    shift_id: Uuid,
) -> ScheduleResult<shift::Model> {
    let shift = find_shift(db, shift_id).await?;
    require_member(db, actor, shift.workspace_id).await?;

    Ok(shift)
}

/// Shifts matching `filter`, limited to workspaces the caller belongs to
///
/// Naming a `workspace_id` the caller is not a member of is `Forbidden`
/// rather than an empty result. Ordered by start time.
pub async fn list_shifts(
    db: &DatabaseConnection,
    actor: Uuid,
    filter: &ShiftFilter,
) -> ScheduleResult<Vec<shift::Model>> {
    if let Some(workspace_id) = filter.workspace_id {
        require_member(db, actor, workspace_id).await?;
    }

    let visible: Vec<Uuid> = workspace_member::Entity::find()
        .filter(workspace_member::Column::UserId.eq(actor))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.workspace_id)
        .collect();

    if visible.is_empty() {
        return Ok(Vec::new());
    }

    let query = shift::Entity::find().filter(shift::Column::WorkspaceId.is_in(visible));

    Ok(filter
        .apply(query)
        .order_by_asc(shift::Column::StartTime)
        .all(db)
        .await?)
}

async fn find_shift<C: ConnectionTrait>(db: &C, shift_id: Uuid) -> ScheduleResult<shift::Model> {
    shift::Entity::find_by_id(shift_id)
        .one(db)
        .await?
        .ok_or_else(|| ScheduleError::not_found("Shift does not exist."))
}

async fn role_in_workspace<C: ConnectionTrait>(
    db: &C,
    role_id: Uuid,
    workspace_id: Uuid,
) -> ScheduleResult<()> {
    let role = find_role(db, role_id).await?;

    if role.workspace_id != workspace_id {
        return Err(ScheduleError::not_found(
            "Role does not belong to this workspace.",
        ));
    }
    Ok(())
}
