//! Scoring and achievement rule tests that run without a database

use assert_matches::assert_matches;
use chrono::Utc;
use proptest::prelude::*;

use letz_engine::config::{EventsRequiredPolicy, GamificationConfig};
use letz_engine::models::{Achievement, AchievementRarity, User};
use letz_engine::services::achievement::{is_eligible, sort_for_unlock};
use letz_engine::services::calculate_level;

fn test_user(points: i32, events_created: i32, events_attended: i32, friends: i32) -> User {
    User {
        id: 42,
        email: "joao@example.com".to_string(),
        username: "joao".to_string(),
        first_name: "Joao".to_string(),
        last_name: "Silva".to_string(),
        bio: None,
        is_active: true,
        events_created,
        events_attended,
        total_friends: friends,
        points,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_achievement(id: i64, rarity: AchievementRarity) -> Achievement {
    Achievement {
        id,
        code: format!("TEST_{}", id),
        name: format!("Test {}", id),
        description: None,
        icon_url: None,
        achievement_type: "SPECIAL".to_string(),
        rarity: rarity.as_str().to_string(),
        points_required: None,
        events_required: None,
        friends_required: None,
        points_reward: 0,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn default_point_values_match_the_scoring_rules() {
    let config = GamificationConfig::default();
    assert_eq!(config.points_per_event_created, 50);
    assert_eq!(config.points_per_event_attended, 20);
    assert_eq!(config.points_per_friend_added, 10);
    assert_matches!(config.events_required_policy, EventsRequiredPolicy::Sum);
}

#[test]
fn level_thresholds() {
    assert_eq!(calculate_level(0), 1);
    assert_eq!(calculate_level(99), 1);
    assert_eq!(calculate_level(100), 2);
    assert_eq!(calculate_level(299), 2);
    assert_eq!(calculate_level(300), 3);
    assert_eq!(calculate_level(599), 3);
    assert_eq!(calculate_level(600), 4);
    assert_eq!(calculate_level(999), 4);
    assert_eq!(calculate_level(1000), 5);
}

#[test]
fn typical_new_user_progression() {
    // create an event, attend two, make a friend
    let points = 50 + 20 + 20 + 10;
    assert_eq!(calculate_level(points), 2);

    let user = test_user(points, 1, 2, 1);
    let mut first_event = test_achievement(1, AchievementRarity::Common);
    first_event.events_required = Some(1);
    assert!(is_eligible(&first_event, &user, EventsRequiredPolicy::Sum));

    let mut butterfly = test_achievement(2, AchievementRarity::Uncommon);
    butterfly.friends_required = Some(5);
    assert!(!is_eligible(&butterfly, &user, EventsRequiredPolicy::Sum));
}

#[test]
fn eligibility_requires_every_threshold() {
    let mut achievement = test_achievement(1, AchievementRarity::Rare);
    achievement.points_required = Some(500);
    achievement.events_required = Some(10);

    let short_on_events = test_user(600, 4, 5, 0);
    assert!(!is_eligible(&achievement, &short_on_events, EventsRequiredPolicy::Sum));

    let qualified = test_user(600, 4, 6, 0);
    assert!(is_eligible(&achievement, &qualified, EventsRequiredPolicy::Sum));
}

#[test]
fn simultaneous_unlocks_order_by_rarity_then_id() {
    let mut batch = vec![
        test_achievement(9, AchievementRarity::Epic),
        test_achievement(2, AchievementRarity::Legendary),
        test_achievement(7, AchievementRarity::Common),
        test_achievement(3, AchievementRarity::Common),
    ];
    sort_for_unlock(&mut batch);
    let ids: Vec<i64> = batch.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 7, 9, 2]);
}

proptest! {
    #[test]
    fn level_never_decreases_with_points(points in 0i32..2_000_000, delta in 0i32..100_000) {
        let before = calculate_level(points);
        let after = calculate_level(points.saturating_add(delta));
        prop_assert!(after >= before);
    }

    #[test]
    fn level_stays_in_range(points in 0i32..i32::MAX) {
        let level = calculate_level(points);
        prop_assert!((1..=5).contains(&level));
    }
}
