//! Integration tests for shiftdesk-db
//!
//! Tests schema constraints with real SQLite in-memory database

use chrono::{TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};
use shiftdesk_db::{
    connect,
    entities::{member_permissions, shift, user, workspace, workspace_member, workspace_role},
    migrate,
};
use uuid::Uuid;

/// Helper to create a test database
async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_user(db: &sea_orm::DatabaseConnection, email: &str) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        phone: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

async fn insert_workspace(db: &sea_orm::DatabaseConnection, owner: &user::Model) -> workspace::Model {
    workspace::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Cafe".to_string()),
        owner_id: Set(owner.id),
        created_by_id: Set(owner.id),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert workspace")
}

fn member(workspace_id: Uuid, user_id: Uuid) -> workspace_member::ActiveModel {
    workspace_member::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(workspace_id),
        user_id: Set(user_id),
        added_by_id: Set(user_id),
        pay_rate: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
}

fn permissions(workspace_id: Uuid, member_id: Uuid, is_owner: bool) -> member_permissions::ActiveModel {
    member_permissions::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(workspace_id),
        member_id: Set(member_id),
        is_owner: Set(is_owner),
        manage_members: Set(is_owner),
        manage_roles: Set(is_owner),
        manage_schedules: Set(is_owner),
        manage_time_off: Set(is_owner),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_duplicate_membership_rejected_by_unique_index() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "owner@example.com").await;
    let ws = insert_workspace(&db, &owner).await;

    member(ws.id, owner.id)
        .insert(&db)
        .await
        .expect("First membership should insert");

    let err = member(ws.id, owner.id)
        .insert(&db)
        .await
        .expect_err("Second membership must violate the unique index");

    assert!(matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn test_second_owner_rejected_by_partial_index() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "owner@example.com").await;
    let other = insert_user(&db, "other@example.com").await;
    let ws = insert_workspace(&db, &owner).await;

    let owner_member = member(ws.id, owner.id).insert(&db).await.unwrap();
    let other_member = member(ws.id, other.id).insert(&db).await.unwrap();

    permissions(ws.id, owner_member.id, true)
        .insert(&db)
        .await
        .expect("Owner row should insert");

    // A second non-owner row is fine
    let second = permissions(ws.id, other_member.id, false)
        .insert(&db)
        .await
        .expect("Non-owner row should insert");

    let mut active: member_permissions::ActiveModel = second.into();
    active.is_owner = Set(true);
    let err = active
        .update(&db)
        .await
        .expect_err("Two owners in one workspace must be rejected");

    assert!(matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    ));
}

#[tokio::test]
async fn test_pay_rate_round_trip() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "owner@example.com").await;
    let ws = insert_workspace(&db, &owner).await;

    let role = workspace_role::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(ws.id),
        name: Set("Barista".to_string()),
        pay_rate: Set(Some(sea_orm::prelude::Decimal::new(1550, 2))),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .expect("Failed to insert role");

    let found = workspace_role::Entity::find_by_id(role.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Role not found");

    assert_eq!(found.name, "Barista");
    assert_eq!(found.pay_rate, Some(sea_orm::prelude::Decimal::new(1550, 2)));
}

#[tokio::test]
async fn test_query_shifts_by_workspace() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "owner@example.com").await;
    let ws = insert_workspace(&db, &owner).await;
    let owner_member = member(ws.id, owner.id).insert(&db).await.unwrap();

    let role = workspace_role::ActiveModel {
        id: Set(Uuid::new_v4()),
        workspace_id: Set(ws.id),
        name: Set("Cook".to_string()),
        pay_rate: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .unwrap();

    for day in 1..=3 {
        shift::ActiveModel {
            id: Set(Uuid::new_v4()),
            workspace_id: Set(ws.id),
            role_id: Set(role.id),
            member_id: Set(None),
            created_by_id: Set(owner_member.id),
            start_time: Set(Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap()),
            end_time: Set(Utc.with_ymd_and_hms(2025, 3, day, 17, 0, 0).unwrap()),
            open: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(&db)
        .await
        .expect("Failed to insert shift");
    }

    let count = shift::Entity::find()
        .filter(shift::Column::WorkspaceId.eq(ws.id))
        .filter(shift::Column::Open.eq(true))
        .count(&db)
        .await
        .expect("Failed to count");

    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_workspace_delete_cascades_memberships() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "owner@example.com").await;
    let ws = insert_workspace(&db, &owner).await;
    let owner_member = member(ws.id, owner.id).insert(&db).await.unwrap();
    permissions(ws.id, owner_member.id, true)
        .insert(&db)
        .await
        .unwrap();

    ws.delete(&db).await.expect("Failed to delete workspace");

    let members = workspace_member::Entity::find().count(&db).await.unwrap();
    let perms = member_permissions::Entity::find().count(&db).await.unwrap();
    assert_eq!(members, 0);
    assert_eq!(perms, 0);
}
