//! Repository integration tests against a real database.
//!
//! `#[sqlx::test]` creates a scratch database per test from `DATABASE_URL`.

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;
use vowline_core::error::CoreError;
use vowline_core::guest_csv::{export_guests, parse_guests, FamilyRecord, MemberRecord};
use vowline_core::i18n::Language;
use vowline_core::rsvp::{MemberType, NewMember, RsvpSubmission, MAX_GUEST_ADDED_MEMBERS};
use vowline_core::seating::SeatAssignment;
use vowline_core::theme::system_themes;
use vowline_core::tracking::notifiable_types;
use vowline_db::models::family::{CreateFamily, CreateFamilyMember};
use vowline_db::models::principal::CreatePlanner;
use vowline_db::models::table::{CreateTable, UpdateTable};
use vowline_db::models::tracking::{NewTrackingEvent, NotificationQuery};
use vowline_db::models::wedding::{CreateWedding, Wedding};
use vowline_db::repositories::{
    FamilyRepo, GuardedWriteError, NotificationReadRepo, PlannerRepo, TableRepo, ThemeRepo,
    TrackingEventRepo, WeddingRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_wedding(pool: &PgPool) -> Wedding {
    let planner = PlannerRepo::create(
        pool,
        "planner@example.com",
        &CreatePlanner {
            email: "planner@example.com".into(),
            name: "Planner".into(),
            password: None,
            logo_url: None,
        },
        None,
    )
    .await
    .unwrap();
    WeddingRepo::create(
        pool,
        planner.id,
        &CreateWedding {
            couple_names: "Ana & Ben".into(),
            wedding_date: NaiveDate::from_ymd_opt(2027, 6, 12).unwrap(),
            wedding_time: Some("17:00".into()),
            location: Some("Lisbon".into()),
            venue_address: None,
            default_language: None,
            rsvp_cutoff_date: None,
            theme_id: None,
        },
    )
    .await
    .unwrap()
}

fn family_input(name: &str, members: &[&str]) -> CreateFamily {
    CreateFamily {
        name: name.into(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
        whatsapp_number: None,
        preferred_language: None,
        channel_preference: None,
        members: members
            .iter()
            .map(|m| CreateFamilyMember {
                name: (*m).into(),
                member_type: None,
                age: None,
                dietary_restrictions: None,
                accessibility_needs: None,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn health_check_succeeds(pool: PgPool) {
    vowline_db::health_check(&pool).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn theme_seeding_is_idempotent(pool: PgPool) {
    let themes = system_themes();
    let first = ThemeRepo::seed_system(&pool, &themes).await.unwrap();
    assert_eq!(first, themes.len() as u64);
    let before = ThemeRepo::list_all(&pool).await.unwrap();

    let second = ThemeRepo::seed_system(&pool, &themes).await.unwrap();
    assert_eq!(second, 0);
    let after = ThemeRepo::list_all(&pool).await.unwrap();
    assert_eq!(before, after);
}

#[sqlx::test(migrations = "./migrations")]
async fn magic_token_resolves_to_its_wedding(pool: PgPool) {
    let wedding = seed_wedding(&pool).await;
    let input = family_input("Silva", &["Rui"]);
    let created = FamilyRepo::create(&pool, wedding.id, &input, "tok_silva", None)
        .await
        .unwrap();
    assert_eq!(created.members.len(), 1);

    let found = FamilyRepo::find_by_token(&pool, "tok_silva").await.unwrap().unwrap();
    assert_eq!(found.wedding_id, wedding.id);
    assert!(FamilyRepo::find_by_token(&pool, "nope").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn seat_assignment_respects_capacity(pool: PgPool) {
    let wedding = seed_wedding(&pool).await;
    let family = FamilyRepo::create(
        &pool,
        wedding.id,
        &family_input("Costa", &["A", "B", "C"]),
        "tok_costa",
        None,
    )
    .await
    .unwrap();
    let table = TableRepo::create(
        &pool,
        wedding.id,
        &CreateTable { name: "Table 1".into(), capacity: 2, number: Some(1) },
    )
    .await
    .unwrap();

    let seat = |i: usize| SeatAssignment {
        member_id: family.members[i].id,
        table_id: Some(table.id),
    };
    TableRepo::assign_seats(&pool, wedding.id, &[seat(0), seat(1)]).await.unwrap();

    let err = TableRepo::assign_seats(&pool, wedding.id, &[seat(2)]).await.unwrap_err();
    assert_matches!(err, GuardedWriteError::Rejected(CoreError::Validation(_)));
    assert_eq!(TableRepo::occupancy(&pool, table.id).await.unwrap(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn csv_import_reproduces_exported_records(pool: PgPool) {
    let wedding = seed_wedding(&pool).await;
    let records = vec![FamilyRecord {
        name: "Moreau".into(),
        email: Some("moreau@example.com".into()),
        phone: None,
        whatsapp: Some("+33600000000".into()),
        language: Language::Fr,
        channel: None,
        members: vec![
            MemberRecord {
                name: "Claire".into(),
                member_type: MemberType::Adult,
                age: None,
                dietary_restrictions: Some("vegetarian".into()),
            },
            MemberRecord {
                name: "Léo".into(),
                member_type: MemberType::Child,
                age: Some(7),
                dietary_restrictions: None,
            },
        ],
    }];
    let csv = export_guests(&records);
    let parsed = parse_guests(&csv).unwrap();
    let created = FamilyRepo::import_records(&pool, wedding.id, &parsed, None).await.unwrap();
    assert_eq!(created, 1);

    let stored = FamilyRepo::list_with_members(&pool, wedding.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].family.name, "Moreau");
    assert_eq!(stored[0].family.preferred_language, "fr");
    let names: Vec<&str> = stored[0].members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["Claire", "Léo"]);
    assert_eq!(stored[0].members[1].member_type, "CHILD");
}

#[sqlx::test(migrations = "./migrations")]
async fn table_capacity_cannot_shrink_below_seated_guests(pool: PgPool) {
    let wedding = seed_wedding(&pool).await;
    let family = FamilyRepo::create(
        &pool,
        wedding.id,
        &family_input("Pereira", &["A", "B", "C"]),
        "tok_pereira",
        None,
    )
    .await
    .unwrap();
    let table = TableRepo::create(
        &pool,
        wedding.id,
        &CreateTable { name: "Table 2".into(), capacity: 4, number: Some(2) },
    )
    .await
    .unwrap();
    let seats: Vec<SeatAssignment> = family
        .members
        .iter()
        .map(|m| SeatAssignment { member_id: m.id, table_id: Some(table.id) })
        .collect();
    TableRepo::assign_seats(&pool, wedding.id, &seats).await.unwrap();

    let shrink = |capacity| UpdateTable { name: None, capacity: Some(capacity), number: None };
    let err = TableRepo::update(&pool, wedding.id, table.id, &shrink(2)).await.unwrap_err();
    assert_matches!(err, GuardedWriteError::Rejected(CoreError::Validation(_)));
    let unchanged = TableRepo::find_in_wedding(&pool, wedding.id, table.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.capacity, 4);

    let updated = TableRepo::update(&pool, wedding.id, table.id, &shrink(3))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.capacity, 3);

    let missing = TableRepo::update(&pool, wedding.id, table.id + 1000, &shrink(3)).await.unwrap();
    assert!(missing.is_none());
}

fn plus_ones(count: usize) -> RsvpSubmission {
    RsvpSubmission {
        members: vec![],
        new_members: (0..count)
            .map(|i| NewMember {
                name: format!("Guest {i}"),
                member_type: MemberType::Adult,
                age: None,
                attending: true,
                dietary_restrictions: None,
            })
            .collect(),
        preferred_language: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn guest_added_members_are_capped_across_submissions(pool: PgPool) {
    let wedding = seed_wedding(&pool).await;
    let input = family_input("Lima", &["Ines"]);
    let family = FamilyRepo::create(&pool, wedding.id, &input, "tok_lima", None)
        .await
        .unwrap();
    let family_id = family.family.id;

    let first = FamilyRepo::submit_rsvp(&pool, family_id, &plus_ones(MAX_GUEST_ADDED_MEMBERS - 1), None)
        .await
        .unwrap();
    assert!(first.first_response);
    assert_eq!(first.members_added, MAX_GUEST_ADDED_MEMBERS - 1);

    let err = FamilyRepo::submit_rsvp(&pool, family_id, &plus_ones(2), None)
        .await
        .unwrap_err();
    assert_matches!(err, GuardedWriteError::Rejected(CoreError::Validation(_)));

    let last = FamilyRepo::submit_rsvp(&pool, family_id, &plus_ones(1), None)
        .await
        .unwrap();
    assert!(!last.first_response);

    let stored = FamilyRepo::list_with_members(&pool, wedding.id).await.unwrap();
    let added = stored[0].members.iter().filter(|m| m.added_by_guest).count();
    assert_eq!(added, MAX_GUEST_ADDED_MEMBERS);
}

#[sqlx::test(migrations = "./migrations")]
async fn families_sharing_a_name_survive_export_and_import(pool: PgPool) {
    let wedding = seed_wedding(&pool).await;
    let household = |email: &str, member: &str| FamilyRecord {
        name: "Smith".into(),
        email: Some(email.into()),
        phone: None,
        whatsapp: None,
        language: Language::En,
        channel: None,
        members: vec![MemberRecord {
            name: member.into(),
            member_type: MemberType::Adult,
            age: None,
            dietary_restrictions: None,
        }],
    };
    let records = vec![
        household("smith.north@example.com", "Ann"),
        household("smith.south@example.com", "Bob"),
    ];

    let parsed = parse_guests(&export_guests(&records)).unwrap();
    assert_eq!(parsed, records);
    assert_eq!(FamilyRepo::import_records(&pool, wedding.id, &parsed, None).await.unwrap(), 2);

    let stored = FamilyRepo::list_with_members(&pool, wedding.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    for family in &stored {
        assert_eq!(family.family.name, "Smith");
        assert_eq!(family.members.len(), 1);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn notifications_are_filtered_before_the_limit(pool: PgPool) {
    let wedding = seed_wedding(&pool).await;
    let family = FamilyRepo::create(&pool, wedding.id, &family_input("Rossi", &["Gia"]), "tok_rossi", None)
        .await
        .unwrap();
    let event = |event_type: &str, family_id: Option<i64>| NewTrackingEvent {
        wedding_id: wedding.id,
        family_id,
        event_type: event_type.into(),
        channel: None,
        metadata: serde_json::json!({}),
        admin_triggered: false,
    };

    let opened = TrackingEventRepo::insert(&pool, &event("LINK_OPENED", Some(family.family.id)))
        .await
        .unwrap();
    TrackingEventRepo::insert(&pool, &event("RSVP_SUBMITTED", Some(family.family.id)))
        .await
        .unwrap();
    for _ in 0..5 {
        TrackingEventRepo::insert(&pool, &event("REMINDER_SENT", None)).await.unwrap();
    }

    let types = notifiable_types();
    let mut query = NotificationQuery {
        reader_email: "admin@example.com",
        event_types: &types,
        family_id: None,
        unread_only: false,
        since: None,
        limit: 2,
    };
    let page = TrackingEventRepo::list_notifications(&pool, wedding.id, &query).await.unwrap();
    let names: Vec<&str> = page.iter().map(|r| r.event.event_type.as_str()).collect();
    assert_eq!(names, ["RSVP_SUBMITTED", "LINK_OPENED"]);
    assert_eq!(page[1].event.family_name.as_deref(), Some("Rossi"));

    assert!(NotificationReadRepo::mark_read(&pool, opened, "admin@example.com").await.unwrap());
    query.unread_only = true;
    let unread = TrackingEventRepo::list_notifications(&pool, wedding.id, &query).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].event.event_type, "RSVP_SUBMITTED");

    query.unread_only = false;
    query.family_id = Some(family.family.id + 1000);
    assert!(TrackingEventRepo::list_notifications(&pool, wedding.id, &query).await.unwrap().is_empty());

    let counts = TrackingEventRepo::count_notifications(&pool, wedding.id, "admin@example.com", &types, None)
        .await
        .unwrap();
    let total: i64 = counts.iter().map(|c| c.total).sum();
    let unread: i64 = counts.iter().map(|c| c.unread).sum();
    assert_eq!((total, unread), (2, 1));

    let marked = NotificationReadRepo::mark_all_read(&pool, wedding.id, "admin@example.com", &types)
        .await
        .unwrap();
    assert_eq!(marked, 1);
    let again = NotificationReadRepo::mark_all_read(&pool, wedding.id, "admin@example.com", &types)
        .await
        .unwrap();
    assert_eq!(again, 0);
    let other_reader =
        TrackingEventRepo::count_notifications(&pool, wedding.id, "planner@example.com", &types, None)
            .await
            .unwrap();
    assert_eq!(other_reader.iter().map(|c| c.unread).sum::<i64>(), 2);
}
