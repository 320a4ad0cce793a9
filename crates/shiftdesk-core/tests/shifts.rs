//! Shift state machine and scheduling scenarios

mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use common::*;
use shiftdesk_core::{
    shifts, workspaces, Capability, NewShift, ScheduleError, ShiftFilter, ShiftPatch, ShiftState,
};
use uuid::Uuid;

fn open_shift(workspace_id: Uuid, role_id: Uuid, day: u32) -> NewShift {
    NewShift {
        workspace_id,
        role_id,
        start_time: at(day, 9),
        end_time: at(day, 17),
        member_id: None,
    }
}

#[tokio::test]
async fn test_granted_member_can_schedule_and_stranger_cannot() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let bob = create_user(&db, "bob").await;
    let carol = create_user(&db, "carol").await;
    let member = add_member(&db, owner.id, ws.id, bob.id).await;
    let role = create_role(&db, owner.id, ws.id, "Barista").await;

    let err = shifts::create_shift(&db, bob.id, open_shift(ws.id, role.id, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Forbidden(_)));

    grant(&db, owner.id, ws.id, member.id, Capability::ManageSchedules).await;

    let shift = shifts::create_shift(&db, bob.id, open_shift(ws.id, role.id, 10))
        .await
        .unwrap();
    assert_eq!(shift.created_by_id, member.id);

    let err = shifts::create_shift(&db, carol.id, open_shift(ws.id, role.id, 11))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Forbidden(_)));
}

#[tokio::test]
async fn test_open_shift_becomes_assigned() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let bob = create_user(&db, "bob").await;
    let member = add_member(&db, owner.id, ws.id, bob.id).await;
    let role = create_role(&db, owner.id, ws.id, "Barista").await;

    let shift = shifts::create_shift(&db, owner.id, open_shift(ws.id, role.id, 10))
        .await
        .unwrap();
    assert!(shift.open);
    assert_eq!(shift.member_id, None);
    assert_eq!(ShiftState::of(&shift), ShiftState::Open);

    let assigned = shifts::modify_shift(
        &db,
        owner.id,
        shift.id,
        ShiftPatch {
            member_id: Some(member.id),
            ..ShiftPatch::default()
        },
    )
    .await
    .unwrap();

    assert!(!assigned.open);
    assert_eq!(assigned.member_id, Some(member.id));
    assert_eq!(ShiftState::of(&assigned), ShiftState::Assigned(member.id));
    assert_eq!(assigned.start_time, shift.start_time);

    // Patching an unrelated field keeps the assignment
    let moved = shifts::modify_shift(
        &db,
        owner.id,
        shift.id,
        ShiftPatch {
            end_time: Some(at(10, 18)),
            ..ShiftPatch::default()
        },
    )
    .await
    .unwrap();
    assert!(!moved.open);
    assert_eq!(moved.member_id, Some(member.id));
}

#[tokio::test]
async fn test_create_with_member_is_assigned() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let bob = create_user(&db, "bob").await;
    let member = add_member(&db, owner.id, ws.id, bob.id).await;
    let role = create_role(&db, owner.id, ws.id, "Barista").await;

    let shift = shifts::create_shift(
        &db,
        owner.id,
        NewShift {
            member_id: Some(member.id),
            ..open_shift(ws.id, role.id, 12)
        },
    )
    .await
    .unwrap();

    assert!(!shift.open);
    assert_eq!(shift.member_id, Some(member.id));
}

#[tokio::test]
async fn test_time_range_checks_effective_pair() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let role = create_role(&db, owner.id, ws.id, "Barista").await;

    let err = shifts::create_shift(
        &db,
        owner.id,
        NewShift {
            start_time: at(10, 17),
            end_time: at(10, 9),
            ..open_shift(ws.id, role.id, 10)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));

    let shift = shifts::create_shift(&db, owner.id, open_shift(ws.id, role.id, 10))
        .await
        .unwrap();

    // Only start moves, past the stored end
    let err = shifts::modify_shift(
        &db,
        owner.id,
        shift.id,
        ShiftPatch {
            start_time: Some(at(10, 18)),
            ..ShiftPatch::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));

    // Moving both ends together is fine
    let moved = shifts::modify_shift(
        &db,
        owner.id,
        shift.id,
        ShiftPatch {
            start_time: Some(at(10, 18)),
            end_time: Some(at(10, 22)),
            ..ShiftPatch::default()
        },
    )
    .await
    .unwrap();
    assert!(moved.start_time <= moved.end_time);
    assert_eq!(moved.end_time, at(10, 22));
}

#[tokio::test]
async fn test_references_must_belong_to_workspace() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let other = workspaces::create_workspace(&db, owner.id, Some("Other".to_string()))
        .await
        .unwrap();
    let role = create_role(&db, owner.id, ws.id, "Barista").await;
    let foreign_role = create_role(&db, owner.id, other.id, "Baker").await;
    let bob = create_user(&db, "bob").await;
    let foreign_member = add_member(&db, owner.id, other.id, bob.id).await;

    let err = shifts::create_shift(&db, owner.id, open_shift(ws.id, foreign_role.id, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound(_)));

    let err = shifts::create_shift(
        &db,
        owner.id,
        NewShift {
            member_id: Some(foreign_member.id),
            ..open_shift(ws.id, role.id, 10)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound(_)));

    let err = shifts::create_shift(&db, owner.id, open_shift(Uuid::new_v4(), role.id, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound(_)));

    let shift = shifts::create_shift(&db, owner.id, open_shift(ws.id, role.id, 10))
        .await
        .unwrap();
    let err = shifts::modify_shift(
        &db,
        owner.id,
        shift.id,
        ShiftPatch {
            role_id: Some(foreign_role.id),
            ..ShiftPatch::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_and_get_shift() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let bob = create_user(&db, "bob").await;
    let stranger = create_user(&db, "dave").await;
    add_member(&db, owner.id, ws.id, bob.id).await;
    let role = create_role(&db, owner.id, ws.id, "Barista").await;
    let shift = shifts::create_shift(&db, owner.id, open_shift(ws.id, role.id, 10))
        .await
        .unwrap();

    // Any member can read, only schedulers can delete
    shifts::get_shift(&db, bob.id, shift.id).await.unwrap();
    let err = shifts::get_shift(&db, stranger.id, shift.id).await.unwrap_err();
    assert!(matches!(err, ScheduleError::Forbidden(_)));

    let err = shifts::delete_shift(&db, bob.id, shift.id).await.unwrap_err();
    assert!(matches!(err, ScheduleError::Forbidden(_)));

    shifts::delete_shift(&db, owner.id, shift.id).await.unwrap();

    let err = shifts::get_shift(&db, owner.id, shift.id).await.unwrap_err();
    assert!(matches!(err, ScheduleError::NotFound(_)));
}

#[tokio::test]
async fn test_list_shifts_filters_and_scoping() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let bob = create_user(&db, "bob").await;
    let member = add_member(&db, owner.id, ws.id, bob.id).await;
    let role = create_role(&db, owner.id, ws.id, "Barista").await;

    for day in [3, 1, 5, 7] {
        shifts::create_shift(&db, owner.id, open_shift(ws.id, role.id, day))
            .await
            .unwrap();
    }
    shifts::create_shift(
        &db,
        owner.id,
        NewShift {
            member_id: Some(member.id),
            ..open_shift(ws.id, role.id, 4)
        },
    )
    .await
    .unwrap();

    // A workspace bob cannot see
    let carol = create_user(&db, "carol").await;
    let hidden_ws = workspaces::create_workspace(&db, carol.id, None).await.unwrap();
    let hidden_role = create_role(&db, carol.id, hidden_ws.id, "Baker").await;
    shifts::create_shift(&db, carol.id, open_shift(hidden_ws.id, hidden_role.id, 3))
        .await
        .unwrap();

    let all = shifts::list_shifts(&db, bob.id, &ShiftFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].start_time <= w[1].start_time));
    assert!(all.iter().all(|s| s.workspace_id == ws.id));

    let open = shifts::list_shifts(
        &db,
        bob.id,
        &ShiftFilter {
            open: Some(true),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(open.len(), 4);

    let mine = shifts::list_shifts(
        &db,
        bob.id,
        &ShiftFilter {
            member_id: Some(member.id),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(mine.len(), 1);
    assert!(!mine[0].open);

    // Both bounds inclusive by date
    let ranged = shifts::list_shifts(
        &db,
        bob.id,
        &ShiftFilter {
            range_start: NaiveDate::from_ymd_opt(2025, 3, 3),
            range_end: NaiveDate::from_ymd_opt(2025, 3, 5),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(ranged.len(), 3);

    // Open-ended when only one bound is given
    let from = shifts::list_shifts(
        &db,
        bob.id,
        &ShiftFilter {
            range_start: NaiveDate::from_ymd_opt(2025, 3, 5),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(from.len(), 2);

    let err = shifts::list_shifts(
        &db,
        bob.id,
        &ShiftFilter {
            workspace_id: Some(hidden_ws.id),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ScheduleError::Forbidden(_)));

    let stranger = create_user(&db, "dave").await;
    let none = shifts::list_shifts(&db, stranger.id, &ShiftFilter::default())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_range_end_includes_whole_day() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let role = create_role(&db, owner.id, ws.id, "Barista").await;

    let late = Utc.with_ymd_and_hms(2025, 3, 10, 23, 59, 59).unwrap();
    let midnight = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
    for start in [late, midnight] {
        shifts::create_shift(
            &db,
            owner.id,
            NewShift {
                start_time: start,
                end_time: start,
                ..open_shift(ws.id, role.id, 10)
            },
        )
        .await
        .unwrap();
    }

    let same_day = shifts::list_shifts(
        &db,
        owner.id,
        &ShiftFilter {
            range_start: NaiveDate::from_ymd_opt(2025, 3, 10),
            range_end: NaiveDate::from_ymd_opt(2025, 3, 10),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(same_day.len(), 1);
    assert_eq!(same_day[0].start_time, late);

    // The last representable date leaves the upper bound open
    let unbounded = shifts::list_shifts(
        &db,
        owner.id,
        &ShiftFilter {
            range_end: Some(NaiveDate::MAX),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(unbounded.len(), 2);

    let filter: ShiftFilter = serde_json::from_str(r#"{"range_end": "+262142-12-31"}"#).unwrap();
    assert_eq!(filter.range_end, Some(NaiveDate::MAX));
    let parsed = shifts::list_shifts(&db, owner.id, &filter).await.unwrap();
    assert_eq!(parsed.len(), 2);
}

#[tokio::test]
async fn test_list_shifts_by_id_role_and_creator() {
    let db = setup_test_db().await;
    let (owner, ws) = workspace_with_owner(&db).await;
    let bob = create_user(&db, "bob").await;
    let scheduler = add_member(&db, owner.id, ws.id, bob.id).await;
    grant(&db, owner.id, ws.id, scheduler.id, Capability::ManageSchedules).await;
    let barista = create_role(&db, owner.id, ws.id, "Barista").await;
    let baker = create_role(&db, owner.id, ws.id, "Baker").await;

    let first = shifts::create_shift(&db, owner.id, open_shift(ws.id, barista.id, 3))
        .await
        .unwrap();
    shifts::create_shift(&db, owner.id, open_shift(ws.id, baker.id, 4))
        .await
        .unwrap();
    let by_bob = shifts::create_shift(&db, bob.id, open_shift(ws.id, barista.id, 5))
        .await
        .unwrap();

    let one = shifts::list_shifts(
        &db,
        owner.id,
        &ShiftFilter {
            shift_id: Some(first.id),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].id, first.id);

    let baristas = shifts::list_shifts(
        &db,
        owner.id,
        &ShiftFilter {
            role_id: Some(barista.id),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(baristas.len(), 2);
    assert!(baristas.iter().all(|s| s.role_id == barista.id));

    let created = shifts::list_shifts(
        &db,
        owner.id,
        &ShiftFilter {
            created_by_id: Some(scheduler.id),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id, by_bob.id);

    // Conditions combine
    let none = shifts::list_shifts(
        &db,
        owner.id,
        &ShiftFilter {
            role_id: Some(baker.id),
            created_by_id: Some(scheduler.id),
            ..ShiftFilter::default()
        },
    )
    .await
    .unwrap();
    assert!(none.is_empty());
}
