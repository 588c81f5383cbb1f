//! Data models for the Wayfarer travel store.
//!
//! This module contains the core domain models: users with their follower
//! graph, places, travel plans with owned itinerary items, and saved-plan
//! bookmarks, plus the pagination types shared by every paged query.
//!
//! All timestamped models carry `created_at` / `updated_at` pairs, and the
//! three root entities (`User`, `Place`, `TravelPlan`) additionally carry a
//! `version` counter for optimistic concurrency and an `is_deleted` flag for
//! soft deletion. Read queries exclude soft-deleted rows unless documented
//! otherwise.

pub mod itinerary;
pub mod page;
pub mod place;
pub mod saved_plan;
pub mod status;
pub mod travel_plan;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export all public types at the models level
pub use itinerary::ItineraryItem;
pub use page::{Page, PageRequest, SortDirection, SortSpec};
pub use place::Place;
pub use saved_plan::SavedPlan;
pub use status::PlanStatus;
pub use travel_plan::TravelPlan;
pub use user::User;
