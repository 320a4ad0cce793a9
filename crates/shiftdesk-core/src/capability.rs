//! Capability flags attached to a workspace membership
//!
//! A membership's permissions are one flat record: four named capability
//! booleans plus an owner bit that implies all of them.

use serde::{Deserialize, Serialize};
use shiftdesk_db::entities::member_permissions;
use std::fmt;

/// A named permission to mutate one facet of a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageMembers,
    ManageRoles,
    ManageSchedules,
    ManageTimeOff,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::ManageMembers,
        Capability::ManageRoles,
        Capability::ManageSchedules,
        Capability::ManageTimeOff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageMembers => "manage_members",
            Capability::ManageRoles => "manage_roles",
            Capability::ManageSchedules => "manage_schedules",
            Capability::ManageTimeOff => "manage_time_off",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective permission set of one membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub is_owner: bool,
    pub manage_members: bool,
    pub manage_roles: bool,
    pub manage_schedules: bool,
    pub manage_time_off: bool,
}

impl Capabilities {
    /// Everything granted, owner bit set
    pub fn owner() -> Self {
        Self {
            is_owner: true,
            manage_members: true,
            manage_roles: true,
            manage_schedules: true,
            manage_time_off: true,
        }
    }

    /// Raw flag, ignoring the owner override
    pub fn flag(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageMembers => self.manage_members,
            Capability::ManageRoles => self.manage_roles,
            Capability::ManageSchedules => self.manage_schedules,
            Capability::ManageTimeOff => self.manage_time_off,
        }
    }

    /// Whether this set grants `capability` (owner grants everything)
    pub fn allows(&self, capability: Capability) -> bool {
        self.is_owner || self.flag(capability)
    }
}

impl From<&member_permissions::Model> for Capabilities {
    fn from(row: &member_permissions::Model) -> Self {
        Self {
            is_owner: row.is_owner,
            manage_members: row.manage_members,
            manage_roles: row.manage_roles,
            manage_schedules: row.manage_schedules,
            manage_time_off: row.manage_time_off,
        }
    }
}

/// Partial permission update; absent fields are left untouched
///
/// `is_owner` is accepted only so that its presence can be rejected: owner
/// status changes only through ownership transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionsPatch {
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

impl PermissionsPatch {
    pub fn touches_owner(&self) -> bool {
        self.is_owner.is_some()
    }

    /// Apply the capability fields onto `caps`; the owner bit is never applied
    pub fn apply(&self, caps: &mut Capabilities) {
        if let Some(value) = self.manage_members {
            caps.manage_members = value;
        }
        if let Some(value) = self.manage_roles {
            caps.manage_roles = value;
        }
        if let Some(value) = self.manage_schedules {
            caps.manage_schedules = value;
        }
        if let Some(value) = self.manage_time_off {
            caps.manage_time_off = value;
        }
    }
}
