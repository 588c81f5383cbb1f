mod common;

use common::{create_test_store, new_place, new_plan, new_user};
use jiff::civil::date;
use wayfarer_core::{
    params::{NewItineraryItem, UpdateTravelPlan},
    PageRequest, PlanStatus, StoreBuilder, StoreError,
};

#[tokio::test]
async fn test_store_builder_creates_parent_directories() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let nested = temp_dir.path().join("deeply").join("nested").join("app.db");

    let store = StoreBuilder::new()
        .with_database_path(Some(&nested))
        .build()
        .await
        .expect("Failed to build store");

    let user = store
        .create_user(&new_user("a@example.com", "alice"))
        .await
        .expect("Failed to create user");
    assert!(user.id > 0);
    assert!(nested.exists());
}

#[tokio::test]
async fn test_store_end_to_end_trip_flow() {
    let (_temp_dir, store) = create_test_store().await;

    let alice = store
        .create_user(&new_user("a@example.com", "alice"))
        .await
        .expect("Failed to create user");

    let palace = store
        .create_place(&new_place("Gyeongbokgung", 37.5796, 126.977))
        .await
        .expect("Failed to create place");

    let mut params = new_plan(alice.id, "Seoul", date(2026, 9, 1), date(2026, 9, 3));
    params.is_public = true;
    let plan = store
        .create_travel_plan(&params)
        .await
        .expect("Failed to create plan");

    store
        .add_item(&NewItineraryItem {
            travel_plan_id: plan.id,
            place_id: Some(palace.id),
            day_number: 1,
            sequence: 1,
            title: Some("Palace tour".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to add item");

    // Every call above ran in its own transaction; the loaded plan sees
    // all of them.
    let loaded = store
        .get_travel_plan(plan.id)
        .await
        .expect("Failed to load plan")
        .expect("Plan should exist");
    assert_eq!(loaded.itinerary.len(), 1);
    assert_eq!(loaded.itinerary[0].place_id, Some(palace.id));

    let results = store
        .search_public_plans("seoul", PageRequest::of(0, 10))
        .await
        .expect("Failed to search");
    assert_eq!(results.total_elements, 1);

    let nearby = store
        .find_nearby_places(37.5663, 126.9779, 5_000.0)
        .await
        .expect("Failed to query nearby");
    assert_eq!(nearby.len(), 1);
}

#[tokio::test]
async fn test_store_surfaces_version_conflicts() {
    let (_temp_dir, store) = create_test_store().await;

    let alice = store
        .create_user(&new_user("a@example.com", "alice"))
        .await
        .expect("Failed to create user");
    let plan = store
        .create_travel_plan(&new_plan(alice.id, "Jeju", date(2026, 4, 10), date(2026, 4, 13)))
        .await
        .expect("Failed to create plan");

    store
        .update_travel_plan(&UpdateTravelPlan {
            id: plan.id,
            expected_version: 0,
            status: Some(PlanStatus::Confirmed),
            ..Default::default()
        })
        .await
        .expect("First update should succeed");

    let stale = store
        .update_travel_plan(&UpdateTravelPlan {
            id: plan.id,
            expected_version: 0,
            status: Some(PlanStatus::Cancelled),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        stale,
        Err(StoreError::VersionConflict { entity: "travel_plan", .. })
    ));
}

#[tokio::test]
async fn test_store_save_and_follow_round_trip() {
    let (_temp_dir, store) = create_test_store().await;

    let alice = store
        .create_user(&new_user("a@example.com", "alice"))
        .await
        .expect("Failed to create user");
    let bob = store
        .create_user(&new_user("b@example.com", "bob"))
        .await
        .expect("Failed to create user");

    let mut params = new_plan(alice.id, "Jeju", date(2026, 4, 10), date(2026, 4, 13));
    params.is_public = true;
    let plan = store
        .create_travel_plan(&params)
        .await
        .expect("Failed to create plan");

    store
        .follow_user(alice.id, bob.id)
        .await
        .expect("Failed to follow");
    store
        .save_plan(bob.id, plan.id)
        .await
        .expect("Failed to save plan");

    assert_eq!(store.count_followers(alice.id).await.unwrap(), 1);
    assert!(store.saved_plan_exists(bob.id, plan.id).await.unwrap());

    let saved = store
        .find_saved_plans_by_user(bob.id, PageRequest::of(0, 10))
        .await
        .expect("Failed to list saved plans");
    assert_eq!(saved.total_elements, 1);
    assert_eq!(saved.content[0].travel_plan_id, plan.id);

    assert!(store.unsave_plan(bob.id, plan.id).await.unwrap());
    assert!(store.unfollow_user(alice.id, bob.id).await.unwrap());
}

#[tokio::test]
async fn test_store_handles_concurrent_readers() {
    let (_temp_dir, store) = create_test_store().await;

    let alice = store
        .create_user(&new_user("a@example.com", "alice"))
        .await
        .expect("Failed to create user");
    for month in 1..=4i8 {
        store
            .create_travel_plan(&new_plan(
                alice.id,
                "Jeju",
                date(2026, month, 1),
                date(2026, month, 5),
            ))
            .await
            .expect("Failed to create plan");
    }

    // Each query opens its own connection, so readers can run side by side.
    let (by_user, overlapping) = tokio::join!(
        store.find_plans_by_user(alice.id, PageRequest::of(0, 10)),
        store.find_overlapping_plans(alice.id, date(2026, 2, 3), date(2026, 3, 2)),
    );
    assert_eq!(by_user.expect("Failed to list plans").total_elements, 4);
    assert_eq!(overlapping.expect("Failed to query overlap").len(), 2);
}
