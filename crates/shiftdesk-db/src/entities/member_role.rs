//! MemberRole entity: many-to-many join between members and workspace roles

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub workspace_role_id: Uuid,

    pub member_id: Uuid,

    /// When the role was assigned
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspace_role::Entity",
        from = "Column::WorkspaceRoleId",
        to = "super::workspace_role::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    WorkspaceRole,

    #[sea_orm(
        belongs_to = "super::workspace_member::Entity",
        from = "Column::MemberId",
        to = "super::workspace_member::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Member,
}

impl Related<super::workspace_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkspaceRole.def()
    }
}

impl Related<super::workspace_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
