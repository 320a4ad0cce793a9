//! Shared fixtures for core integration tests

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use shiftdesk_core::{roles, users, workspaces, Capability, NewRole, NewUser, PermissionsPatch};
use shiftdesk_db::entities::{user, workspace, workspace_member, workspace_role};
use uuid::Uuid;

pub async fn setup_test_db() -> DatabaseConnection {
    let db = shiftdesk_db::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    shiftdesk_db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn create_user(db: &DatabaseConnection, name: &str) -> user::Model {
    users::create_user(
        db,
        NewUser {
            email: format!("{}@example.com", name),
            first_name: name.to_string(),
            last_name: "Tester".to_string(),
            phone: None,
        },
    )
    .await
    .expect("Failed to create user")
}

/// Owner `a`, workspace `W`
pub async fn workspace_with_owner(db: &DatabaseConnection) -> (user::Model, workspace::Model) {
    let owner = create_user(db, "alice").await;
    let ws = workspaces::create_workspace(db, owner.id, Some("Cafe".to_string()))
        .await
        .expect("Failed to create workspace");

    (owner, ws)
}

pub async fn add_member(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    user_id: Uuid,
) -> workspace_member::Model {
    workspaces::add_member(db, actor, workspace_id, user_id, None)
        .await
        .expect("Failed to add member")
}

/// Grant a single capability through the public permission API
pub async fn grant(
    db: &DatabaseConnection,
    owner: Uuid,
    workspace_id: Uuid,
    member_id: Uuid,
    capability: Capability,
) {
    let mut patch = PermissionsPatch::default();
    match capability {
        Capability::ManageMembers => patch.manage_members = Some(true),
        Capability::ManageRoles => patch.manage_roles = Some(true),
        Capability::ManageSchedules => patch.manage_schedules = Some(true),
        Capability::ManageTimeOff => patch.manage_time_off = Some(true),
    }

    shiftdesk_core::permissions::update_permissions(db, owner, workspace_id, member_id, patch)
        .await
        .expect("Failed to grant capability");
}

pub async fn create_role(
    db: &DatabaseConnection,
    actor: Uuid,
    workspace_id: Uuid,
    name: &str,
) -> workspace_role::Model {
    roles::create_role(
        db,
        actor,
        workspace_id,
        NewRole {
            name: Some(name.to_string()),
            pay_rate: None,
        },
    )
    .await
    .expect("Failed to create role")
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}
