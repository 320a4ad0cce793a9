//! Identity records referenced by memberships
//!
//! Credentials live with the identity provider; this store only keeps the
//! profile a membership points at.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use shiftdesk_db::entities::user;
use tracing::info;
use uuid::Uuid;

use crate::error::{ScheduleError, ScheduleResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Register a user profile; emails are unique
pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> ScheduleResult<user::Model> {
    let email = new_user.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(ScheduleError::validation("A valid email is required."));
    }

    let now = Utc::now();
    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        phone: Set(new_user.phone),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(|e| ScheduleError::from_insert(e, "Account with this email already exists."))?;

    info!("Created user {} ({})", created.id, created.email);
    Ok(created)
}

pub async fn get_user(db: &DatabaseConnection, user_id: Uuid) -> ScheduleResult<user::Model> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ScheduleError::not_found("User does not exist."))
}
