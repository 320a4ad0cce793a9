//! Initial schema: users, workspaces, memberships, permissions, roles, shifts

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create users table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 100).not_null().unique_key())
                    .col(string_len(User::FirstName, 30).not_null())
                    .col(string_len(User::LastName, 30).not_null())
                    .col(string_len_null(User::Phone, 30))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create workspaces table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Workspace::Table)
                    .if_not_exists()
                    .col(uuid(Workspace::Id).primary_key())
                    .col(string_len(Workspace::Name, 30).not_null())
                    .col(uuid(Workspace::OwnerId).not_null())
                    .col(uuid(Workspace::CreatedById).not_null())
                    .col(
                        timestamp_with_time_zone(Workspace::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Workspace::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspaces_owner_id")
                            .from(Workspace::Table, Workspace::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspaces_created_by_id")
                            .from(Workspace::Table, Workspace::CreatedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspaces_owner_id")
                    .table(Workspace::Table)
                    .col(Workspace::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create workspace_members table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(WorkspaceMember::Table)
                    .if_not_exists()
                    .col(uuid(WorkspaceMember::Id).primary_key())
                    .col(uuid(WorkspaceMember::WorkspaceId).not_null())
                    .col(uuid(WorkspaceMember::UserId).not_null())
                    .col(uuid(WorkspaceMember::AddedById).not_null())
                    .col(
                        ColumnDef::new(WorkspaceMember::PayRate)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(
                        timestamp_with_time_zone(WorkspaceMember::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(WorkspaceMember::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspace_members_workspace_id")
                            .from(WorkspaceMember::Table, WorkspaceMember::WorkspaceId)
                            .to(Workspace::Table, Workspace::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspace_members_user_id")
                            .from(WorkspaceMember::Table, WorkspaceMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Authoritative guard against duplicate memberships
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_workspace_members_workspace_user")
                    .table(WorkspaceMember::Table)
                    .col(WorkspaceMember::WorkspaceId)
                    .col(WorkspaceMember::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspace_members_user_id")
                    .table(WorkspaceMember::Table)
                    .col(WorkspaceMember::UserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create member_permissions table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(MemberPermissions::Table)
                    .if_not_exists()
                    .col(uuid(MemberPermissions::Id).primary_key())
                    .col(uuid(MemberPermissions::WorkspaceId).not_null())
                    .col(uuid(MemberPermissions::MemberId).not_null().unique_key())
                    .col(
                        boolean(MemberPermissions::IsOwner)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        boolean(MemberPermissions::ManageMembers)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        boolean(MemberPermissions::ManageRoles)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        boolean(MemberPermissions::ManageSchedules)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        boolean(MemberPermissions::ManageTimeOff)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        timestamp_with_time_zone(MemberPermissions::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(MemberPermissions::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_permissions_workspace_id")
                            .from(MemberPermissions::Table, MemberPermissions::WorkspaceId)
                            .to(Workspace::Table, Workspace::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_permissions_member_id")
                            .from(MemberPermissions::Table, MemberPermissions::MemberId)
                            .to(WorkspaceMember::Table, WorkspaceMember::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create workspace_roles table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(WorkspaceRole::Table)
                    .if_not_exists()
                    .col(uuid(WorkspaceRole::Id).primary_key())
                    .col(uuid(WorkspaceRole::WorkspaceId).not_null())
                    .col(
                        string_len(WorkspaceRole::Name, 30)
                            .not_null()
                            .default("Unnamed Role"),
                    )
                    .col(
                        ColumnDef::new(WorkspaceRole::PayRate)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(
                        timestamp_with_time_zone(WorkspaceRole::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(WorkspaceRole::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspace_roles_workspace_id")
                            .from(WorkspaceRole::Table, WorkspaceRole::WorkspaceId)
                            .to(Workspace::Table, Workspace::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_workspace_roles_workspace_id")
                    .table(WorkspaceRole::Table)
                    .col(WorkspaceRole::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. Create member_roles junction table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(MemberRole::Table)
                    .if_not_exists()
                    .col(uuid(MemberRole::Id).primary_key())
                    .col(uuid(MemberRole::WorkspaceRoleId).not_null())
                    .col(uuid(MemberRole::MemberId).not_null())
                    .col(
                        timestamp_with_time_zone(MemberRole::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_roles_workspace_role_id")
                            .from(MemberRole::Table, MemberRole::WorkspaceRoleId)
                            .to(WorkspaceRole::Table, WorkspaceRole::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_roles_member_id")
                            .from(MemberRole::Table, MemberRole::MemberId)
                            .to(WorkspaceMember::Table, WorkspaceMember::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_member_roles_role_member")
                    .table(MemberRole::Table)
                    .col(MemberRole::WorkspaceRoleId)
                    .col(MemberRole::MemberId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 7. Create shifts table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Shift::Table)
                    .if_not_exists()
                    .col(uuid(Shift::Id).primary_key())
                    .col(uuid(Shift::WorkspaceId).not_null())
                    .col(uuid(Shift::RoleId).not_null())
                    .col(uuid_null(Shift::MemberId))
                    .col(uuid(Shift::CreatedById).not_null())
                    .col(timestamp_with_time_zone(Shift::StartTime).not_null())
                    .col(timestamp_with_time_zone(Shift::EndTime).not_null())
                    .col(boolean(Shift::Open).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Shift::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Shift::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shifts_workspace_id")
                            .from(Shift::Table, Shift::WorkspaceId)
                            .to(Workspace::Table, Workspace::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shifts_role_id")
                            .from(Shift::Table, Shift::RoleId)
                            .to(WorkspaceRole::Table, WorkspaceRole::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shifts_member_id")
                            .from(Shift::Table, Shift::MemberId)
                            .to(WorkspaceMember::Table, WorkspaceMember::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shifts_created_by_id")
                            .from(Shift::Table, Shift::CreatedById)
                            .to(WorkspaceMember::Table, WorkspaceMember::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shifts_workspace_start_time")
                    .table(Shift::Table)
                    .col(Shift::WorkspaceId)
                    .col(Shift::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_shifts_member_id")
                    .table(Shift::Table)
                    .col(Shift::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(Shift::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MemberRole::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(WorkspaceRole::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MemberPermissions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(WorkspaceMember::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Workspace::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    Phone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Workspace {
    #[sea_orm(iden = "workspaces")]
    Table,
    Id,
    Name,
    OwnerId,
    CreatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkspaceMember {
    #[sea_orm(iden = "workspace_members")]
    Table,
    Id,
    WorkspaceId,
    UserId,
    AddedById,
    PayRate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MemberPermissions {
    #[sea_orm(iden = "member_permissions")]
    Table,
    Id,
    WorkspaceId,
    MemberId,
    IsOwner,
    ManageMembers,
    ManageRoles,
    ManageSchedules,
    ManageTimeOff,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkspaceRole {
    #[sea_orm(iden = "workspace_roles")]
    Table,
    Id,
    WorkspaceId,
    Name,
    PayRate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MemberRole {
    #[sea_orm(iden = "member_roles")]
    Table,
    Id,
    WorkspaceRoleId,
    MemberId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shift {
    #[sea_orm(iden = "shifts")]
    Table,
    Id,
    WorkspaceId,
    RoleId,
    MemberId,
    CreatedById,
    StartTime,
    EndTime,
    Open,
    CreatedAt,
    UpdatedAt,
}
