//! Place model definition.

use std::collections::{BTreeMap, BTreeSet};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Represents a point of interest that itinerary items can reference.
///
/// Places are referenced, never owned: deleting a plan or an itinerary item
/// leaves the place untouched, and places are soft-deleted independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    /// Unique identifier for the place
    pub id: u64,

    /// External map-provider id (unique when present)
    pub naver_place_id: Option<String>,

    /// Display name (required)
    pub name: String,

    /// Category label (required, exact-match filterable)
    pub category: String,

    /// Longer description
    pub description: Option<String>,

    /// Street address (required)
    pub address: String,

    /// Road-name address variant
    pub road_address: Option<String>,

    /// Latitude in degrees (required)
    pub latitude: f64,

    /// Longitude in degrees (required)
    pub longitude: f64,

    /// Contact phone number
    pub phone_number: Option<String>,

    /// Website URL
    pub website: Option<String>,

    /// Weekday -> opening-hours description
    #[serde(default)]
    pub opening_hours: BTreeMap<String, String>,

    /// Ordered list of image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Tag set (order-insensitive)
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Average rating, absent until first review
    pub rating: Option<f64>,

    /// Number of reviews
    pub review_count: i64,

    /// Number of bookmarks
    pub bookmark_count: i64,

    /// Number of views
    pub view_count: i64,

    /// Whether the place data has been verified
    pub is_verified: bool,

    /// Precomputed trending score, decoupled from the raw counters
    pub popularity_score: f64,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// Optimistic-lock version counter
    pub version: i64,

    /// Timestamp when the place was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the place was last modified (UTC)
    pub updated_at: Timestamp,
}
