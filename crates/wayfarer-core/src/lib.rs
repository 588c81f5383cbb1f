//! Core library for the Wayfarer travel planning store.
//!
//! This crate provides the persistence and query layer for a travel planning
//! application: users and their follower graph, places, travel plans with
//! ordered itineraries, and saved-plan bookmarks, backed by SQLite.
//!
//! Three concerns shape the API:
//!
//! - **Constraints**: uniqueness and required fields are enforced by the
//!   schema and surface as [`StoreError::Constraint`](error::StoreError).
//! - **Optimistic concurrency**: updates to users, places, and plans carry
//!   the caller's observed `version`; a stale version yields
//!   [`StoreError::VersionConflict`](error::StoreError) instead of silently
//!   overwriting.
//! - **Lifecycle**: entities soft-delete by default and drop out of queries;
//!   hard deletes cascade through owned rows in one transaction.
//!
//! # Quick Start
//!
//! ```rust
//! use wayfarer_core::{StoreBuilder, params::{NewUser, NewTravelPlan}};
//! use jiff::civil::date;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("wayfarer.db"))
//!     .build()
//!     .await?;
//!
//! let user = store
//!     .create_user(&NewUser {
//!         email: "traveler@example.com".to_string(),
//!         nickname: "traveler".to_string(),
//!         provider: "google".to_string(),
//!         provider_id: "g-1234".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let plan = store
//!     .create_travel_plan(&NewTravelPlan {
//!         user_id: user.id,
//!         title: "Jeju long weekend".to_string(),
//!         description: None,
//!         destination: "Jeju".to_string(),
//!         start_date: date(2026, 4, 10),
//!         end_date: date(2026, 4, 13),
//!         number_of_people: Some(2),
//!         budget: None,
//!         status: Default::default(),
//!         is_public: true,
//!         is_ai_generated: false,
//!         cover_image_url: None,
//!         preferences: Default::default(),
//!         tags: Default::default(),
//!     })
//!     .await?;
//! println!("Created plan {} for {}", plan.id, plan.destination);
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod params;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use error::{Result, StoreError};
pub use models::{
    ItineraryItem, Page, PageRequest, Place, PlanStatus, SavedPlan, SortDirection, SortSpec,
    TravelPlan, User,
};
pub use params::{
    NewItineraryItem, NewPlace, NewTravelPlan, NewUser, UpdateItineraryItem, UpdatePlace,
    UpdateTravelPlan, UpdateUser,
};
pub use store::{Store, StoreBuilder};
