mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::{create_test_db, new_place};
use wayfarer_core::{
    params::{NewPlace, UpdatePlace},
    PageRequest, SortSpec, StoreError,
};

#[test]
fn test_create_place_with_collections() {
    let (_temp_file, mut db) = create_test_db();

    let mut params = new_place("Gyeongbokgung", 37.5796, 126.977);
    params.images = vec![
        "https://img/1.jpg".to_string(),
        "https://img/2.jpg".to_string(),
        "https://img/3.jpg".to_string(),
    ];
    params.tags = BTreeSet::from(["palace".to_string(), "history".to_string()]);
    params
        .opening_hours
        .insert("monday".to_string(), "09:00-18:00".to_string());

    let place = db.create_place(&params).expect("Failed to create place");

    assert!(place.id > 0);
    assert_eq!(place.version, 0);
    // Image order survives the round trip.
    assert_eq!(place.images, params.images);
    assert_eq!(place.tags, params.tags);
    assert_eq!(
        place.opening_hours.get("monday").map(String::as_str),
        Some("09:00-18:00")
    );
    assert_eq!(place.view_count, 0);
    assert_eq!(place.popularity_score, 0.0);
}

#[test]
fn test_duplicate_naver_id_is_constraint_violation() {
    let (_temp_file, mut db) = create_test_db();

    let mut params = new_place("First", 37.0, 127.0);
    params.naver_place_id = Some("naver-1".to_string());
    db.create_place(&params).expect("Failed to create place");

    assert!(db.place_exists_by_naver_id("naver-1").unwrap());
    assert!(!db.place_exists_by_naver_id("naver-2").unwrap());

    let mut dup = new_place("Second", 37.1, 127.1);
    dup.naver_place_id = Some("naver-1".to_string());
    assert!(matches!(
        db.create_place(&dup),
        Err(StoreError::Constraint { .. })
    ));

    // NULL external ids do not collide.
    db.create_place(&new_place("Third", 37.2, 127.2))
        .expect("Failed to create place");
    db.create_place(&new_place("Fourth", 37.3, 127.3))
        .expect("Failed to create place");
}

#[test]
fn test_search_places_matches_name_address_description() {
    let (_temp_file, mut db) = create_test_db();

    db.create_place(&new_place("Bukchon Hanok Village", 37.58, 126.98))
        .expect("Failed to create place");
    let mut by_description = new_place("Some Cafe", 37.57, 126.97);
    by_description.description = Some("Quiet spot near Bukchon".to_string());
    db.create_place(&by_description)
        .expect("Failed to create place");
    db.create_place(&new_place("Haeundae Beach", 35.16, 129.16))
        .expect("Failed to create place");

    let page = db
        .search_places("bukchon", &PageRequest::of(0, 10))
        .expect("Failed to search");
    assert_eq!(page.total_elements, 2);
}

#[test]
fn test_search_places_escapes_like_wildcards() {
    let (_temp_file, mut db) = create_test_db();

    db.create_place(&new_place("100% Juice Bar", 37.5, 127.0))
        .expect("Failed to create place");
    db.create_place(&new_place("1000 Juice Bar", 37.5, 127.0))
        .expect("Failed to create place");

    let page = db
        .search_places("100%", &PageRequest::of(0, 10))
        .expect("Failed to search");
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].name, "100% Juice Bar");
}

#[test]
fn test_find_nearby_places_orders_by_distance() {
    let (_temp_file, mut db) = create_test_db();

    // Seoul City Hall as the origin.
    let origin = (37.5663, 126.9779);
    db.create_place(&new_place("Deoksugung", 37.5658, 126.9751))
        .expect("Failed to create place");
    db.create_place(&new_place("Gwanghwamun", 37.5759, 126.9769))
        .expect("Failed to create place");
    db.create_place(&new_place("Busan Station", 35.1151, 129.0415))
        .expect("Failed to create place");

    let nearby = db
        .find_nearby_places(origin.0, origin.1, 5_000.0)
        .expect("Failed to query nearby places");

    let names: Vec<&str> = nearby.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Deoksugung", "Gwanghwamun"]);

    // A tight radius keeps only the closest place.
    let tight = db
        .find_nearby_places(origin.0, origin.1, 400.0)
        .expect("Failed to query nearby places");
    assert_eq!(tight.len(), 1);
    assert_eq!(tight[0].name, "Deoksugung");
}

#[test]
fn test_find_places_by_category_filters() {
    let (_temp_file, mut db) = create_test_db();

    let mut cafe = new_place("Cafe One", 37.5, 127.0);
    cafe.category = "cafe".to_string();
    db.create_place(&cafe).expect("Failed to create place");
    let mut restaurant = new_place("Restaurant One", 37.5, 127.0);
    restaurant.category = "restaurant".to_string();
    db.create_place(&restaurant).expect("Failed to create place");
    db.create_place(&new_place("Palace", 37.5, 127.0))
        .expect("Failed to create place");

    let cafes = db
        .find_places_by_category("cafe", &PageRequest::of(0, 10))
        .expect("Failed to query");
    assert_eq!(cafes.total_elements, 1);

    let eateries = db
        .find_places_by_categories(
            &["cafe".to_string(), "restaurant".to_string()],
            &PageRequest::of(0, 10),
        )
        .expect("Failed to query");
    assert_eq!(eateries.total_elements, 2);

    let none = db
        .find_places_by_categories(&[], &PageRequest::of(0, 10))
        .expect("Failed to query");
    assert!(none.is_empty());
    assert_eq!(none.total_elements, 0);
}

#[test]
fn test_find_places_by_tags_matches_any_tag() {
    let (_temp_file, mut db) = create_test_db();

    let mut tagged = new_place("Night Market", 37.5, 127.0);
    tagged.tags = BTreeSet::from(["food".to_string(), "night".to_string()]);
    db.create_place(&tagged).expect("Failed to create place");
    let mut other = new_place("Art Gallery", 37.5, 127.0);
    other.tags = BTreeSet::from(["art".to_string()]);
    db.create_place(&other).expect("Failed to create place");

    let page = db
        .find_places_by_tags(
            &["night".to_string(), "outdoor".to_string()],
            &PageRequest::of(0, 10),
        )
        .expect("Failed to query");
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].name, "Night Market");

    let none = db
        .find_places_by_tags(&[], &PageRequest::of(0, 10))
        .expect("Failed to query");
    assert_eq!(none.total_elements, 0);
}

#[test]
fn test_minimum_rating_excludes_unrated_and_sorts_best_first() {
    let (_temp_file, mut db) = create_test_db();

    let mut good = new_place("Good", 37.5, 127.0);
    good.rating = Some(4.5);
    db.create_place(&good).expect("Failed to create place");
    let mut better = new_place("Better", 37.5, 127.0);
    better.rating = Some(4.9);
    db.create_place(&better).expect("Failed to create place");
    let mut poor = new_place("Poor", 37.5, 127.0);
    poor.rating = Some(2.0);
    db.create_place(&poor).expect("Failed to create place");
    db.create_place(&new_place("Unrated", 37.5, 127.0))
        .expect("Failed to create place");

    let page = db
        .find_places_by_minimum_rating(4.0, &PageRequest::of(0, 10))
        .expect("Failed to query");
    let names: Vec<&str> = page.content.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Better", "Good"]);
}

#[test]
fn test_top_popular_places_require_verification() {
    let (_temp_file, mut db) = create_test_db();

    let mut verified = new_place("Verified", 37.5, 127.0);
    verified.is_verified = true;
    let verified = db.create_place(&verified).expect("Failed to create place");
    let unverified = db
        .create_place(&new_place("Unverified", 37.5, 127.0))
        .expect("Failed to create place");

    db.update_popularity_score(verified.id, 80.0)
        .expect("Failed to set score");
    db.update_popularity_score(unverified.id, 99.0)
        .expect("Failed to set score");

    let top = db
        .find_top_popular_places(&PageRequest::of(0, 10))
        .expect("Failed to query");
    assert_eq!(top.total_elements, 1);
    assert_eq!(top.content[0].name, "Verified");
    assert_eq!(top.content[0].popularity_score, 80.0);
}

#[test]
fn test_top_popular_places_order_and_pagination() {
    let (_temp_file, mut db) = create_test_db();

    for (name, score) in [("Mid", 50.0), ("Top", 90.0), ("Low", 10.0)] {
        let mut params = new_place(name, 37.5, 127.0);
        params.is_verified = true;
        let place = db.create_place(&params).expect("Failed to create place");
        db.update_popularity_score(place.id, score)
            .expect("Failed to set score");
    }

    let first = db
        .find_top_popular_places(&PageRequest::of(0, 2))
        .expect("Failed to query");
    assert_eq!(first.total_elements, 3);
    let names: Vec<&str> = first.content.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Top", "Mid"]);
    assert!(first.has_next());

    let second = db
        .find_top_popular_places(&PageRequest::of(1, 2))
        .expect("Failed to query");
    assert_eq!(second.content.len(), 1);
    assert_eq!(second.content[0].name, "Low");
}

#[test]
fn test_soft_deleted_place_hidden_from_discovery() {
    let (_temp_file, mut db) = create_test_db();

    let place = db
        .create_place(&new_place("Ephemeral", 37.5, 127.0))
        .expect("Failed to create place");
    db.soft_delete_place(place.id).expect("Failed to delete");

    assert!(db
        .search_places("Ephemeral", &PageRequest::of(0, 10))
        .unwrap()
        .is_empty());
    assert!(db.find_nearby_places(37.5, 127.0, 10_000.0).unwrap().is_empty());

    // Direct lookup still works for audit purposes.
    let raw = db.get_place(place.id).unwrap().unwrap();
    assert!(raw.is_deleted);
}

#[test]
fn test_update_place_is_guarded_by_version() {
    let (_temp_file, mut db) = create_test_db();

    let place = db
        .create_place(&new_place("Old Name", 37.5, 127.0))
        .expect("Failed to create place");

    let updated = db
        .update_place(&UpdatePlace {
            id: place.id,
            expected_version: 0,
            name: Some("New Name".to_string()),
            rating: Some(4.2),
            ..Default::default()
        })
        .expect("Failed to update place");
    assert_eq!(updated.name, "New Name");
    assert_eq!(updated.rating, Some(4.2));
    assert_eq!(updated.version, 1);
    // Untouched fields carry over.
    assert_eq!(updated.address, place.address);

    assert!(matches!(
        db.update_place(&UpdatePlace {
            id: place.id,
            expected_version: 0,
            name: Some("Too Late".to_string()),
            ..Default::default()
        }),
        Err(StoreError::VersionConflict { entity: "place", .. })
    ));
}

#[test]
fn test_replace_place_collections() {
    let (_temp_file, mut db) = create_test_db();

    let mut params = new_place("Changing", 37.5, 127.0);
    params.tags = BTreeSet::from(["old".to_string()]);
    let place = db.create_place(&params).expect("Failed to create place");

    let tags = BTreeSet::from(["new".to_string(), "fresh".to_string()]);
    let place = db
        .replace_place_tags(place.id, 0, &tags)
        .expect("Failed to replace tags");
    assert_eq!(place.tags, tags);
    assert_eq!(place.version, 1);

    let images = vec!["https://img/b.jpg".to_string(), "https://img/a.jpg".to_string()];
    let place = db
        .replace_place_images(place.id, 1, &images)
        .expect("Failed to replace images");
    assert_eq!(place.images, images);

    let mut hours = BTreeMap::new();
    hours.insert("sunday".to_string(), "closed".to_string());
    let place = db
        .replace_place_opening_hours(place.id, 2, &hours)
        .expect("Failed to replace opening hours");
    assert_eq!(place.opening_hours, hours);
    assert_eq!(place.version, 3);

    // A stale version is rejected before anything is touched.
    assert!(matches!(
        db.replace_place_tags(place.id, 0, &tags),
        Err(StoreError::VersionConflict { .. })
    ));
}

#[test]
fn test_engagement_counters_advance_version() {
    let (_temp_file, mut db) = create_test_db();

    let place = db
        .create_place(&new_place("Popular", 37.5, 127.0))
        .expect("Failed to create place");

    db.record_place_view(place.id).expect("Failed to record view");
    db.record_place_view(place.id).expect("Failed to record view");
    db.record_place_bookmark(place.id)
        .expect("Failed to record bookmark");

    let current = db.get_place(place.id).unwrap().unwrap();
    assert_eq!(current.view_count, 2);
    assert_eq!(current.bookmark_count, 1);
    assert_eq!(current.version, 3);

    assert!(matches!(
        db.record_place_view(9999),
        Err(StoreError::NotFound { entity: "place", .. })
    ));
}

#[test]
fn test_sorted_pagination_over_places() {
    let (_temp_file, mut db) = create_test_db();

    for (name, rating) in [("A", 3.0), ("B", 5.0), ("C", 4.0)] {
        let mut params = new_place(name, 37.5, 127.0);
        params.rating = Some(rating);
        db.create_place(&params).expect("Failed to create place");
    }

    let request = PageRequest::of(0, 2).with_sort(SortSpec::desc("rating"));
    let page = db
        .find_places_by_minimum_rating(0.0, &request)
        .expect("Failed to query");
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages(), 2);
    assert!(page.has_next());
    let names: Vec<&str> = page.content.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["B", "C"]);

    assert!(matches!(
        db.find_places_by_minimum_rating(
            0.0,
            &PageRequest::of(0, 2).with_sort(SortSpec::asc("popularity; DROP TABLE places"))
        ),
        Err(StoreError::InvalidInput { .. })
    ));
}

#[test]
fn test_create_place_minimal_defaults() {
    let (_temp_file, mut db) = create_test_db();

    let place = db
        .create_place(&NewPlace {
            name: "Bare".to_string(),
            category: "attraction".to_string(),
            address: "Bare 1-1".to_string(),
            latitude: 37.5,
            longitude: 127.0,
            ..Default::default()
        })
        .expect("Failed to create place");

    assert!(place.naver_place_id.is_none());
    assert!(place.rating.is_none());
    assert!(!place.is_verified);
    assert!(place.images.is_empty());
    assert!(place.tags.is_empty());
    assert!(place.opening_hours.is_empty());
}
