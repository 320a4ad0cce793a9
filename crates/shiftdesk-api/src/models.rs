use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use shiftdesk_core::{Membership, PermissionsPatch, ShiftFilter, ShiftState};
use shiftdesk_db::entities::{member_permissions, member_role, shift, workspace, workspace_member, workspace_role};
use utoipa::ToSchema;
use uuid::Uuid;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Whether the database answered a ping
    pub database: bool,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Distinguishes an explicit `null` (clear) from an absent field (keep)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Workspaces

/// Workspace information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    /// User who owns the workspace
    pub owner_id: Uuid,
    /// User who created the workspace
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<workspace::Model> for Workspace {
    fn from(m: workspace::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            owner_id: m.owner_id,
            created_by_id: m.created_by_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// List of workspaces
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceList {
    pub workspaces: Vec<Workspace>,
    pub total: usize,
}

/// Request to create a workspace
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateWorkspaceRequest {
    /// Workspace name (at most 30 characters, defaults to "Unnamed Workspace")
    #[serde(default)]
    pub name: Option<String>,
}

/// Request to rename a workspace
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateWorkspaceRequest {
    /// New name (at most 30 characters)
    #[serde(default)]
    pub name: Option<String>,
}

/// Request to hand ownership to another member
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferOwnerRequest {
    /// User id of the new owner; must already be a member
    #[serde(default)]
    pub new_owner_user_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Members and permissions

/// Capability flags of one membership
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Permissions {
    pub member_id: Uuid,
    pub workspace_id: Uuid,
    pub is_owner: bool,
    pub manage_members: bool,
    pub manage_roles: bool,
    pub manage_schedules: bool,
    pub manage_time_off: bool,
}

impl From<member_permissions::Model> for Permissions {
    fn from(m: member_permissions::Model) -> Self {
        Self {
            member_id: m.member_id,
            workspace_id: m.workspace_id,
            is_owner: m.is_owner,
            manage_members: m.manage_members,
            manage_roles: m.manage_roles,
            manage_schedules: m.manage_schedules,
            manage_time_off: m.manage_time_off,
        }
    }
}

/// Workspace member
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Member {
    /// Member id (distinct from the user id)
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub added_by_id: Uuid,
    /// Individual hourly pay rate
    #[schema(value_type = Option<String>, example = "15.50")]
    pub pay_rate: Option<Decimal>,
    pub is_owner: bool,
    pub manage_members: bool,
    pub manage_roles: bool,
    pub manage_schedules: bool,
    pub manage_time_off: bool,
    pub created_at: DateTime<Utc>,
}

impl Member {
    fn with_capabilities(m: workspace_member::Model, caps: shiftdesk_core::Capabilities) -> Self {
        Self {
            id: m.id,
            workspace_id: m.workspace_id,
            user_id: m.user_id,
            added_by_id: m.added_by_id,
            pay_rate: m.pay_rate,
            is_owner: caps.is_owner,
            manage_members: caps.manage_members,
            manage_roles: caps.manage_roles,
            manage_schedules: caps.manage_schedules,
            manage_time_off: caps.manage_time_off,
            created_at: m.created_at,
        }
    }
}

impl From<Membership> for Member {
    fn from(m: Membership) -> Self {
        Self::with_capabilities(m.member, m.capabilities)
    }
}

impl From<workspace_member::Model> for Member {
    /// A freshly added member carries default (all-false) capabilities
    fn from(m: workspace_member::Model) -> Self {
        Self::with_capabilities(m, shiftdesk_core::Capabilities::default())
    }
}

/// List of workspace members
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberList {
    pub members: Vec<Member>,
    pub total: usize,
}

/// Request to add a user to a workspace
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    /// User to add
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Optional individual pay rate (0 to 999.99)
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "15.50")]
    pub pay_rate: Option<Decimal>,
}

/// Request to update a member; `pay_rate: null` clears the rate, omitting it keeps it
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "18.00")]
    pub pay_rate: Option<Option<Decimal>>,
}

/// Partial permission update; absent fields are left untouched
///
/// Sending `is_owner` at all is rejected with 409.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePermissionsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_members: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_roles: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_schedules: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage_time_off: Option<bool>,
}

impl From<UpdatePermissionsRequest> for PermissionsPatch {
    fn from(r: UpdatePermissionsRequest) -> Self {
        Self {
            is_owner: r.is_owner,
            manage_members: r.manage_members,
            manage_roles: r.manage_roles,
            manage_schedules: r.manage_schedules,
            manage_time_off: r.manage_time_off,
        }
    }
}

// ---------------------------------------------------------------------------
// Roles

/// Workspace role
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    /// Hourly pay rate attached to the role
    #[schema(value_type = Option<String>, example = "15.50")]
    pub pay_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<workspace_role::Model> for Role {
    fn from(m: workspace_role::Model) -> Self {
        Self {
            id: m.id,
            workspace_id: m.workspace_id,
            name: m.name,
            pay_rate: m.pay_rate,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// List of roles
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleList {
    pub roles: Vec<Role>,
    pub total: usize,
}

/// Request to create a role
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    /// Role name (defaults to "Unnamed Role")
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "15.50")]
    pub pay_rate: Option<Decimal>,
}

/// Partial role update; `pay_rate: null` clears the rate, omitting it keeps it
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "17.25")]
    pub pay_rate: Option<Option<Decimal>>,
}

/// A role held by a member
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberRoleAssignment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<member_role::Model> for MemberRoleAssignment {
    fn from(m: member_role::Model) -> Self {
        Self {
            id: m.id,
            member_id: m.member_id,
            role_id: m.workspace_role_id,
            created_at: m.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Shifts

/// Shift lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    /// No member assigned
    Open,
    /// Assigned to a member
    Assigned,
}

impl From<ShiftState> for ShiftStatus {
    fn from(state: ShiftState) -> Self {
        match state {
            ShiftState::Open => ShiftStatus::Open,
            ShiftState::Assigned(_) => ShiftStatus::Assigned,
        }
    }
}

/// Shift information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Shift {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub role_id: Uuid,
    /// Assigned member, absent while the shift is open
    pub member_id: Option<Uuid>,
    /// Member who created the shift
    pub created_by_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub open: bool,
    pub status: ShiftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<shift::Model> for Shift {
    fn from(m: shift::Model) -> Self {
        let status = ShiftStatus::from(ShiftState::of(&m));

        Self {
            id: m.id,
            workspace_id: m.workspace_id,
            role_id: m.role_id,
            member_id: m.member_id,
            created_by_id: m.created_by_id,
            start_time: m.start_time,
            end_time: m.end_time,
            open: m.open,
            status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// List of shifts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShiftList {
    pub shifts: Vec<Shift>,
    pub total: usize,
}

/// Request to create a shift
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateShiftRequest {
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub role_id: Option<Uuid>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Member to assign; omit to create an open shift
    #[serde(default)]
    pub member_id: Option<Uuid>,
}

/// Partial shift update
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateShiftRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Uuid>,
    /// Assigns the shift; there is no way to unassign
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<Uuid>,
}

/// Query parameters for filtering shifts
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ShiftQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<Uuid>,
    /// First day (UTC) of the start-time range, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_start: Option<NaiveDate>,
    /// Last day (UTC) of the start-time range, inclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_end: Option<NaiveDate>,
}

impl From<ShiftQuery> for ShiftFilter {
    fn from(q: ShiftQuery) -> Self {
        Self {
            shift_id: q.shift_id,
            workspace_id: q.workspace_id,
            member_id: q.member_id,
            role_id: q.role_id,
            open: q.open,
            created_by_id: q.created_by_id,
            range_start: q.range_start,
            range_end: q.range_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_patch_distinguishes_null_from_absent() {
        let absent: UpdateRoleRequest = serde_json::from_str(r#"{"name": "Cook"}"#).unwrap();
        assert_eq!(absent.pay_rate, None);

        let cleared: UpdateRoleRequest = serde_json::from_str(r#"{"pay_rate": null}"#).unwrap();
        assert_eq!(cleared.pay_rate, Some(None));

        let set: UpdateRoleRequest = serde_json::from_str(r#"{"pay_rate": "12.50"}"#).unwrap();
        assert_eq!(set.pay_rate, Some(Some(Decimal::new(1250, 2))));
    }

    #[test]
    fn test_member_patch_distinguishes_null_from_absent() {
        let absent: UpdateMemberRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.pay_rate, None);

        let cleared: UpdateMemberRequest = serde_json::from_str(r#"{"pay_rate": null}"#).unwrap();
        assert_eq!(cleared.pay_rate, Some(None));
    }

    #[test]
    fn test_shift_status_from_state() {
        assert_eq!(ShiftStatus::from(ShiftState::Open), ShiftStatus::Open);
        assert_eq!(
            ShiftStatus::from(ShiftState::Assigned(Uuid::new_v4())),
            ShiftStatus::Assigned
        );
    }

    #[test]
    fn test_permissions_request_keeps_is_owner() {
        let request: UpdatePermissionsRequest =
            serde_json::from_str(r#"{"is_owner": true}"#).unwrap();

        assert!(PermissionsPatch::from(request).touches_owner());
    }
}
