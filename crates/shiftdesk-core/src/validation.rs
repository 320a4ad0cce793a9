//! Input checks shared by workspaces, members and roles

use rust_decimal::Decimal;

use crate::error::{ScheduleError, ScheduleResult};

/// Maximum length of workspace and role names
pub const MAX_NAME_LEN: usize = 30;

pub const DEFAULT_WORKSPACE_NAME: &str = "Unnamed Workspace";
pub const DEFAULT_ROLE_NAME: &str = "Unnamed Role";

/// Resolve an optional name to a stored one, falling back to `default`
pub fn name_or_default(name: Option<&str>, default: &str) -> ScheduleResult<String> {
    match name {
        Some(name) => name_field(name),
        None => Ok(default.to_string()),
    }
}

/// Names must be non-blank and at most [`MAX_NAME_LEN`] characters
pub fn name_field(name: &str) -> ScheduleResult<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ScheduleError::validation("Name must not be blank."));
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ScheduleError::validation(format!(
            "Name must be at most {} characters.",
            MAX_NAME_LEN
        )));
    }

    Ok(trimmed.to_string())
}

/// Pay rates are stored as DECIMAL(5, 2): 0 to 999.99, two decimal places
pub fn pay_rate(rate: Option<Decimal>) -> ScheduleResult<Option<Decimal>> {
    let Some(rate) = rate else {
        return Ok(None);
    };

    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(ScheduleError::validation("Pay rate cannot be negative."));
    }

    if rate.normalize().scale() > 2 {
        return Err(ScheduleError::validation(
            "Pay rate may have at most two decimal places.",
        ));
    }

    if rate > Decimal::new(99_999, 2) {
        return Err(ScheduleError::validation("Pay rate cannot exceed 999.99."));
    }

    Ok(Some(rate.round_dp(2)))
}
