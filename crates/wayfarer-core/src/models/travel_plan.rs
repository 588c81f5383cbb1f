//! Travel plan model definition.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ItineraryItem, PlanStatus};

/// Represents a travel plan owned by a user.
///
/// The date range is stored exactly as given; `start_date <= end_date` is a
/// caller-side validation, not a store invariant. Two plans of the same user
/// overlap when their closed `[start_date, end_date]` intervals intersect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TravelPlan {
    /// Unique identifier for the plan
    pub id: u64,

    /// Owning user (required; referential integrity enforced)
    pub user_id: u64,

    /// Title of the plan (required)
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Destination label (required; similarity matching is string equality)
    pub destination: String,

    /// First day of the trip, inclusive
    pub start_date: Date,

    /// Last day of the trip, inclusive
    pub end_date: Date,

    /// Party size
    pub number_of_people: Option<i32>,

    /// Planned budget
    pub budget: Option<f64>,

    /// Lifecycle status
    #[serde(default)]
    pub status: PlanStatus,

    /// Whether the plan is visible in public search
    pub is_public: bool,

    /// Whether the plan was generated by an AI assistant
    pub is_ai_generated: bool,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// Cover image URL
    pub cover_image_url: Option<String>,

    /// Preference map
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,

    /// Tag set (order-insensitive)
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Users collaborating on this plan, distinct from saved-plan bookmarks
    #[serde(default)]
    pub collaborator_ids: Vec<u64>,

    /// Number of views
    pub view_count: i64,

    /// Number of likes
    pub like_count: i64,

    /// Number of shares
    pub share_count: i64,

    /// Number of saved-plan bookmarks referencing this plan
    pub save_count: i64,

    /// Optimistic-lock version counter
    pub version: i64,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,

    /// Owned itinerary items, ordered by (day_number, sequence)
    #[serde(default)]
    pub itinerary: Vec<ItineraryItem>,
}
