use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use tempfile::{NamedTempFile, TempDir};
use wayfarer_core::{
    params::{NewPlace, NewTravelPlan, NewUser},
    Database, PlanStatus, Store, StoreBuilder,
};

/// Helper function to create a temporary database for testing
#[allow(dead_code)]
pub fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

/// Helper function to create a test store
#[allow(dead_code)]
pub async fn create_test_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = StoreBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}

/// Minimal user creation params; provider_id is derived from the email so
/// every user gets a distinct (provider, provider_id) pair.
#[allow(dead_code)]
pub fn new_user(email: &str, nickname: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        nickname: nickname.to_string(),
        provider: "google".to_string(),
        provider_id: format!("g-{email}"),
        ..Default::default()
    }
}

/// Minimal place creation params at the given coordinate.
#[allow(dead_code)]
pub fn new_place(name: &str, latitude: f64, longitude: f64) -> NewPlace {
    NewPlace {
        name: name.to_string(),
        category: "attraction".to_string(),
        address: format!("{name} 1-1"),
        latitude,
        longitude,
        ..Default::default()
    }
}

/// Minimal travel plan creation params for the given owner and date range.
#[allow(dead_code)]
pub fn new_plan(user_id: u64, destination: &str, start: Date, end: Date) -> NewTravelPlan {
    NewTravelPlan {
        user_id,
        title: format!("Trip to {destination}"),
        description: None,
        destination: destination.to_string(),
        start_date: start,
        end_date: end,
        number_of_people: None,
        budget: None,
        status: PlanStatus::default(),
        is_public: false,
        is_ai_generated: false,
        cover_image_url: None,
        preferences: BTreeMap::new(),
        tags: BTreeSet::new(),
    }
}
