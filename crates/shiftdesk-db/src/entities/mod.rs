//! Database entities

pub mod member_permissions;
pub mod member_role;
pub mod shift;
pub mod user;
pub mod workspace;
pub mod workspace_member;
pub mod workspace_role;

pub use member_permissions::Entity as MemberPermissions;
pub use member_role::Entity as MemberRole;
pub use shift::Entity as Shift;
pub use user::Entity as User;
pub use workspace::Entity as Workspace;
pub use workspace_member::Entity as WorkspaceMember;
pub use workspace_role::Entity as WorkspaceRole;

pub mod prelude {
    pub use super::member_permissions::Entity as MemberPermissions;
    pub use super::member_role::Entity as MemberRole;
    pub use super::shift::Entity as Shift;
    pub use super::user::Entity as User;
    pub use super::workspace::Entity as Workspace;
    pub use super::workspace_member::Entity as WorkspaceMember;
    pub use super::workspace_role::Entity as WorkspaceRole;
}
