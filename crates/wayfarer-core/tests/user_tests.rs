mod common;

use std::collections::BTreeMap;

use common::{create_test_db, new_user};
use wayfarer_core::{
    params::{NewUser, UpdateUser},
    PageRequest, StoreError,
};

#[test]
fn test_create_user_initializes_defaults() {
    let (_temp_file, mut db) = create_test_db();

    let user = db
        .create_user(&new_user("a@example.com", "alice"))
        .expect("Failed to create user");

    assert!(user.id > 0);
    assert_eq!(user.version, 0);
    assert!(user.is_active);
    assert!(!user.is_deleted);
    assert!(user.preferences.is_empty());
    assert_eq!(user.created_at, user.updated_at);
}

#[test]
fn test_duplicate_email_is_constraint_violation() {
    let (_temp_file, mut db) = create_test_db();

    db.create_user(&new_user("a@example.com", "alice"))
        .expect("Failed to create user");

    let mut dup = new_user("a@example.com", "other");
    dup.provider_id = "g-different".to_string();
    match db.create_user(&dup) {
        Err(StoreError::Constraint { constraint, .. }) => {
            assert!(constraint.contains("email"), "constraint was: {constraint}");
        }
        other => panic!("Expected Constraint, got {other:?}"),
    }
}

#[test]
fn test_duplicate_provider_pair_is_constraint_violation() {
    let (_temp_file, mut db) = create_test_db();

    let first = new_user("a@example.com", "alice");
    db.create_user(&first).expect("Failed to create user");

    let dup = NewUser {
        email: "b@example.com".to_string(),
        nickname: "bob".to_string(),
        provider: first.provider.clone(),
        provider_id: first.provider_id.clone(),
        ..Default::default()
    };
    assert!(matches!(
        db.create_user(&dup),
        Err(StoreError::Constraint { .. })
    ));
}

#[test]
fn test_find_by_email_and_provider() {
    let (_temp_file, mut db) = create_test_db();

    let created = db
        .create_user(&new_user("a@example.com", "alice"))
        .expect("Failed to create user");

    let by_email = db
        .find_user_by_email("a@example.com")
        .expect("Failed to query")
        .expect("User should exist");
    assert_eq!(by_email.id, created.id);

    let by_provider = db
        .find_user_by_provider("google", "g-a@example.com")
        .expect("Failed to query")
        .expect("User should exist");
    assert_eq!(by_provider.id, created.id);

    assert!(db
        .find_user_by_email("missing@example.com")
        .expect("Failed to query")
        .is_none());
}

#[test]
fn test_existence_checks() {
    let (_temp_file, mut db) = create_test_db();

    db.create_user(&new_user("a@example.com", "alice"))
        .expect("Failed to create user");

    assert!(db.user_exists_by_email("a@example.com").unwrap());
    assert!(!db.user_exists_by_email("b@example.com").unwrap());
    assert!(db.user_exists_by_nickname("alice").unwrap());
    assert!(!db.user_exists_by_nickname("bob").unwrap());
}

#[test]
fn test_search_users_excludes_inactive_and_deleted() {
    let (_temp_file, mut db) = create_test_db();

    db.create_user(&new_user("a@example.com", "seoul-alice"))
        .expect("Failed to create user");
    let inactive = db
        .create_user(&new_user("b@example.com", "seoul-bob"))
        .expect("Failed to create user");
    let deleted = db
        .create_user(&new_user("c@example.com", "seoul-carol"))
        .expect("Failed to create user");

    db.update_user(&UpdateUser {
        id: inactive.id,
        expected_version: 0,
        is_active: Some(false),
        ..Default::default()
    })
    .expect("Failed to deactivate user");
    db.soft_delete_user(deleted.id).expect("Failed to delete");

    let page = db
        .search_users("seoul", &PageRequest::of(0, 10))
        .expect("Failed to search");
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].nickname, "seoul-alice");
}

#[test]
fn test_search_users_treats_wildcards_literally() {
    let (_temp_file, mut db) = create_test_db();

    db.create_user(&new_user("a@example.com", "100%_match"))
        .expect("Failed to create user");
    db.create_user(&new_user("b@example.com", "100x_match"))
        .expect("Failed to create user");

    let page = db
        .search_users("100%", &PageRequest::of(0, 10))
        .expect("Failed to search");
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].nickname, "100%_match");
}

#[test]
fn test_follow_graph_both_directions() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();
    let bob = db.create_user(&new_user("b@example.com", "bob")).unwrap();
    let carol = db.create_user(&new_user("c@example.com", "carol")).unwrap();

    // bob and carol follow alice; alice follows bob.
    db.follow_user(alice.id, bob.id).expect("Failed to follow");
    db.follow_user(alice.id, carol.id).expect("Failed to follow");
    db.follow_user(bob.id, alice.id).expect("Failed to follow");

    let followers = db
        .find_followers(alice.id, &PageRequest::of(0, 10))
        .expect("Failed to list followers");
    let follower_ids: Vec<u64> = followers.content.iter().map(|u| u.id).collect();
    assert_eq!(follower_ids, vec![bob.id, carol.id]);

    let following = db
        .find_following(alice.id, &PageRequest::of(0, 10))
        .expect("Failed to list following");
    assert_eq!(following.content.len(), 1);
    assert_eq!(following.content[0].id, bob.id);

    assert_eq!(db.count_followers(alice.id).unwrap(), 2);
    assert_eq!(db.count_following(alice.id).unwrap(), 1);
    assert_eq!(db.count_followers(bob.id).unwrap(), 1);
}

#[test]
fn test_follow_rejects_self_and_missing_users() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();

    assert!(matches!(
        db.follow_user(alice.id, alice.id),
        Err(StoreError::InvalidInput { .. })
    ));
    assert!(matches!(
        db.follow_user(alice.id, 9999),
        Err(StoreError::NotFound { entity: "user", .. })
    ));
}

#[test]
fn test_follow_twice_is_constraint_violation() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();
    let bob = db.create_user(&new_user("b@example.com", "bob")).unwrap();

    db.follow_user(alice.id, bob.id).expect("Failed to follow");
    assert!(matches!(
        db.follow_user(alice.id, bob.id),
        Err(StoreError::Constraint { .. })
    ));
}

#[test]
fn test_unfollow_is_idempotent() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();
    let bob = db.create_user(&new_user("b@example.com", "bob")).unwrap();

    db.follow_user(alice.id, bob.id).expect("Failed to follow");
    assert!(db.unfollow_user(alice.id, bob.id).unwrap());
    assert!(!db.unfollow_user(alice.id, bob.id).unwrap());
}

#[test]
fn test_update_user_bumps_version_and_preserves_unset_fields() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();

    let updated = db
        .update_user(&UpdateUser {
            id: alice.id,
            expected_version: 0,
            bio: Some("world traveler".to_string()),
            ..Default::default()
        })
        .expect("Failed to update user");

    assert_eq!(updated.version, 1);
    assert_eq!(updated.bio.as_deref(), Some("world traveler"));
    assert_eq!(updated.nickname, "alice");
    assert_eq!(updated.email, "a@example.com");
}

#[test]
fn test_stale_version_is_conflict() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();

    // First writer wins and bumps the version.
    db.update_user(&UpdateUser {
        id: alice.id,
        expected_version: 0,
        nickname: Some("alice2".to_string()),
        ..Default::default()
    })
    .expect("First update should succeed");

    // Second writer still holds version 0.
    match db.update_user(&UpdateUser {
        id: alice.id,
        expected_version: 0,
        nickname: Some("alice3".to_string()),
        ..Default::default()
    }) {
        Err(StoreError::VersionConflict { entity, id, expected }) => {
            assert_eq!(entity, "user");
            assert_eq!(id, alice.id);
            assert_eq!(expected, 0);
        }
        other => panic!("Expected VersionConflict, got {other:?}"),
    }

    let current = db.get_user(alice.id).unwrap().unwrap();
    assert_eq!(current.nickname, "alice2");
    assert_eq!(current.version, 1);
}

#[test]
fn test_update_missing_user_is_not_found() {
    let (_temp_file, mut db) = create_test_db();

    assert!(matches!(
        db.update_user(&UpdateUser {
            id: 42,
            expected_version: 0,
            ..Default::default()
        }),
        Err(StoreError::NotFound { entity: "user", id: 42 })
    ));
}

#[test]
fn test_replace_preferences_round_trip() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();

    let mut prefs = BTreeMap::new();
    prefs.insert("language".to_string(), "ko".to_string());
    prefs.insert("currency".to_string(), "KRW".to_string());

    let updated = db
        .replace_user_preferences(alice.id, 0, &prefs)
        .expect("Failed to replace preferences");
    assert_eq!(updated.preferences, prefs);
    assert_eq!(updated.version, 1);

    // Replacing again drops keys that are no longer present.
    let mut smaller = BTreeMap::new();
    smaller.insert("language".to_string(), "en".to_string());
    let updated = db
        .replace_user_preferences(alice.id, 1, &smaller)
        .expect("Failed to replace preferences");
    assert_eq!(updated.preferences, smaller);

    // Travel preferences are a separate map.
    assert!(updated.travel_preferences.is_empty());
}

#[test]
fn test_soft_delete_hides_user_from_lookups() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();
    db.soft_delete_user(alice.id).expect("Failed to soft-delete");

    // Gone from email lookup, still reachable by id with the flag set.
    assert!(db.find_user_by_email("a@example.com").unwrap().is_none());
    let raw = db.get_user(alice.id).unwrap().unwrap();
    assert!(raw.is_deleted);
    assert!(!raw.is_active);

    // Email stays reserved.
    assert!(db.user_exists_by_email("a@example.com").unwrap());
}

#[test]
fn test_hard_delete_user_removes_owned_rows() {
    let (_temp_file, mut db) = create_test_db();

    let alice = db.create_user(&new_user("a@example.com", "alice")).unwrap();
    let bob = db.create_user(&new_user("b@example.com", "bob")).unwrap();
    db.follow_user(alice.id, bob.id).expect("Failed to follow");

    let plan = db
        .create_travel_plan(&common::new_plan(
            alice.id,
            "Jeju",
            jiff::civil::date(2026, 4, 10),
            jiff::civil::date(2026, 4, 13),
        ))
        .expect("Failed to create plan");

    db.delete_user(alice.id).expect("Failed to delete user");

    assert!(db.get_user(alice.id).unwrap().is_none());
    assert!(db.get_travel_plan(plan.id).unwrap().is_none());
    assert_eq!(db.count_followers(alice.id).unwrap(), 0);

    assert!(matches!(
        db.delete_user(alice.id),
        Err(StoreError::NotFound { entity: "user", .. })
    ));
}
