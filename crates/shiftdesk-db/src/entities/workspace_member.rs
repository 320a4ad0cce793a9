//! WorkspaceMember entity: a user's membership in one workspace
//!
//! `(workspace_id, user_id)` is backed by a unique index; that index, not a
//! prior lookup, is what keeps concurrent adds from producing duplicates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workspace_members")]
pub struct Model {
    /// Membership UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub workspace_id: Uuid,

    pub user_id: Uuid,

    /// User who added this member (the creator for the owner's own row)
    pub added_by_id: Uuid,

    /// Member-specific hourly pay rate, overriding role rates when present
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub pay_rate: Option<Decimal>,

    /// When the user joined the workspace
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
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,

    /// Capability record for this membership
    #[sea_orm(has_one = "super::member_permissions::Entity")]
    Permissions,

    #[sea_orm(has_many = "super::member_role::Entity")]
    Roles,
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::member_permissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permissions.def()
    }
}

impl Related<super::member_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
