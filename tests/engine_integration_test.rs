//! Service-level tests against a live Postgres database
//!
//! These exercise the invariants that live in SQL: capacity under the event
//! row lock, unique-constraint idempotence and the zero floors on counters.
//! Each test skips itself when `TEST_DATABASE_URL` is unset.

mod helpers;

use assert_matches::assert_matches;
use serial_test::serial;

use helpers::TestDatabase;
use letz_engine::models::event::ParticipationStatus;
use letz_engine::LetzError;

#[tokio::test]
#[serial]
async fn capacity_holds_through_the_approval_path() {
    let Some(db) = TestDatabase::connect().await else { return };
    db.cleanup().await;

    let organizer = db.create_user("Olga").await;
    let event = db.create_event(organizer.id, Some(2), true).await;

    let guests = [
        db.create_user("Ana").await,
        db.create_user("Bruno").await,
        db.create_user("Carla").await,
    ];

    // joins only reserve a PENDING slot, so all three pass
    for guest in &guests {
        let participant = db
            .services
            .participation_service
            .join(event.id, guest.id)
            .await
            .expect("join should succeed while nothing is confirmed");
        assert_eq!(participant.participation_status(), ParticipationStatus::Pending);
    }

    db.services
        .participation_service
        .approve(event.id, guests[0].id, organizer.id)
        .await
        .expect("first approval fits");
    db.services
        .participation_service
        .approve(event.id, guests[1].id, organizer.id)
        .await
        .expect("second approval fits");

    let third = db
        .services
        .participation_service
        .approve(event.id, guests[2].id, organizer.id)
        .await;
    assert_matches!(third, Err(LetzError::EventFull { .. }));

    let confirmed = db
        .services
        .participation_service
        .total_confirmed_participants(event.id)
        .await
        .unwrap();
    assert_eq!(confirmed, 2);
}

#[tokio::test]
#[serial]
async fn counters_and_points_floor_at_zero() {
    let Some(db) = TestDatabase::connect().await else { return };
    db.cleanup().await;

    let user = db.create_user("Dario").await;

    // deducting from a fresh account must not go below zero
    let after = db
        .services
        .gamification_service
        .on_friend_removed(user.id)
        .await
        .unwrap();
    assert_eq!(after.points, 0);
    assert_eq!(after.total_friends, 0);

    // a second deduction hits the floor again even after reward credits
    let again = db
        .services
        .gamification_service
        .on_friend_removed(user.id)
        .await
        .unwrap();
    assert!(again.points >= 0);
    assert_eq!(again.total_friends, 0);

    let stats = db
        .services
        .gamification_service
        .get_user_stats(user.id)
        .await
        .unwrap();
    assert!(stats.points >= 0);
    assert_eq!(stats.total_friends, 0);
}

#[tokio::test]
#[serial]
async fn evaluating_twice_never_duplicates_an_unlock() {
    let Some(db) = TestDatabase::connect().await else { return };
    db.cleanup().await;

    let user = db.create_user("Elena").await;

    let first = db.services.achievement_service.evaluate(user.id).await.unwrap();
    assert!(first.iter().any(|a| a.code == "WELCOME"));

    let second = db.services.achievement_service.evaluate(user.id).await.unwrap();
    assert!(second.is_empty());

    assert_eq!(db.count_records("user_achievements").await, first.len() as i64);

    // the WELCOME reward was credited exactly once
    let stats = db
        .services
        .gamification_service
        .get_user_stats(user.id)
        .await
        .unwrap();
    assert_eq!(stats.points, 5);
}

#[tokio::test]
#[serial]
async fn leaving_makes_the_user_eligible_to_join_again() {
    let Some(db) = TestDatabase::connect().await else { return };
    db.cleanup().await;

    let organizer = db.create_user("Fabio").await;
    let guest = db.create_user("Gina").await;
    let event = db.create_event(organizer.id, None, false).await;

    let first_join = db
        .services
        .participation_service
        .join(event.id, guest.id)
        .await
        .unwrap();
    assert_eq!(first_join.participation_status(), ParticipationStatus::Confirmed);

    let duplicate = db.services.participation_service.join(event.id, guest.id).await;
    assert_matches!(duplicate, Err(LetzError::AlreadyParticipating { .. }));

    db.services
        .participation_service
        .leave(event.id, guest.id)
        .await
        .unwrap();

    let rejoin = db
        .services
        .participation_service
        .join(event.id, guest.id)
        .await
        .expect("leaving must free the slot for a fresh join");
    assert_eq!(rejoin.participation_status(), ParticipationStatus::Confirmed);
}

#[tokio::test]
#[serial]
async fn friendship_rows_are_unique_per_pair_in_either_direction() {
    let Some(db) = TestDatabase::connect().await else { return };
    db.cleanup().await;

    let ana = db.create_user("Ana").await;
    let bruno = db.create_user("Bruno").await;

    db.database
        .friendships
        .create(ana.id, bruno.id)
        .await
        .unwrap();

    // the reverse direction hits the pair-wide unique index
    let reversed = db.database.friendships.create(bruno.id, ana.id).await;
    assert_matches!(reversed, Err(LetzError::InvalidInput(_)));

    assert_eq!(db.count_records("friendships").await, 1);
}
