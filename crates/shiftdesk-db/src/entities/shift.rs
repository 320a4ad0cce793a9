//! Shift entity: a scheduled work interval, open or assigned to one member
//!
//! Every write must keep `start_time <= end_time` and
//! `open == member_id.is_none()`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shifts")]
pub struct Model {
    /// Shift UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub workspace_id: Uuid,

    /// Role worked during this shift
    pub role_id: Uuid,

    /// Assigned member; `None` while the shift is open
    pub member_id: Option<Uuid>,

    /// Membership that created the shift
    pub created_by_id: Uuid,

    pub start_time: ChronoDateTimeUtc,

    pub end_time: ChronoDateTimeUtc,

    /// Mirrors `member_id.is_none()`
    pub open: bool,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspace::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspace::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Workspace,

    #[sea_orm(
        belongs_to = "super::workspace_role::Entity",
        from = "Column::RoleId",
        to = "super::workspace_role::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Role,

    /// Member the shift is assigned to
    #[sea_orm(
        belongs_to = "super::workspace_member::Entity",
        from = "Column::MemberId",
        to = "super::workspace_member::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Member,

    /// Member who created the shift
    #[sea_orm(
        belongs_to = "super::workspace_member::Entity",
        from = "Column::CreatedById",
        to = "super::workspace_member::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Creator,
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::workspace_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl Related<super::workspace_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
