//! Authorization and scheduling core for shiftdesk
//!
//! Every mutating operation resolves the caller's membership in the target
//! workspace through [`authz::authorize`] and performs its writes inside a
//! single database transaction.

pub mod authz;
pub mod capability;
pub mod error;
pub mod permissions;
pub mod roles;
pub mod shifts;
pub mod users;
pub mod validation;
pub mod workspaces;

pub use authz::{authorize, require_member, require_owner, Membership};
pub use capability::{Capabilities, Capability, PermissionsPatch};
pub use error::{ScheduleError, ScheduleResult};
pub use roles::{NewRole, RolePatch};
pub use shifts::{NewShift, ShiftFilter, ShiftPatch, ShiftState};
pub use users::NewUser;

/// Re-exported so callers can name pay rates without a direct dependency
pub use rust_decimal::Decimal;
