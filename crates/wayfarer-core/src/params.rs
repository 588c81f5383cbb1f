//! Parameter structures for Wayfarer store operations.
//!
//! This module contains the parameter structures passed from callers into the
//! store layer. Creation structs (`New*`) carry the full set of writable
//! fields for a new record; update structs (`Update*`) carry the target id
//! plus optional fields where `None` preserves the current value.
//!
//! Updates to versioned entities (`User`, `Place`, `TravelPlan`) additionally
//! carry `expected_version`: the write only applies when the stored version
//! still matches, otherwise the operation fails with a version conflict and
//! the caller is expected to re-read and retry.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::models::PlanStatus;

/// Parameters for registering a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    /// Email address (required, unique)
    pub email: String,
    /// Optional unique handle
    pub username: Option<String>,
    /// Display name (required)
    pub nickname: String,
    /// Free-form profile text
    pub bio: Option<String>,
    /// Profile image URL
    pub profile_image_url: Option<String>,
    /// OAuth provider name (required)
    pub provider: String,
    /// Provider-scoped account id; (provider, provider_id) must be unique
    pub provider_id: String,
    /// Initial general preferences
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    /// Initial travel preferences
    #[serde(default)]
    pub travel_preferences: BTreeMap<String, String>,
}

/// Parameters for updating an existing user.
///
/// Email, provider, and provider_id are fixed at registration and cannot be
/// changed here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// User ID to update (required)
    pub id: u64,
    /// Version the caller last read; the update fails on mismatch
    pub expected_version: i64,
    /// Updated handle
    pub username: Option<String>,
    /// Updated display name
    pub nickname: Option<String>,
    /// Updated profile text
    pub bio: Option<String>,
    /// Updated profile image URL
    pub profile_image_url: Option<String>,
    /// Updated active flag
    pub is_active: Option<bool>,
}

/// Parameters for creating a new place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPlace {
    /// External map-provider id (unique when present)
    pub naver_place_id: Option<String>,
    /// Display name (required)
    pub name: String,
    /// Category label (required)
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
    /// Initial tag set
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Initial rating, if already known
    pub rating: Option<f64>,
    /// Whether the place data has been verified
    #[serde(default)]
    pub is_verified: bool,
}

/// Parameters for updating an existing place's scalar fields.
///
/// Collections (tags, images, opening hours) are replaced wholesale through
/// their dedicated operations instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlace {
    /// Place ID to update (required)
    pub id: u64,
    /// Version the caller last read; the update fails on mismatch
    pub expected_version: i64,
    /// Updated display name
    pub name: Option<String>,
    /// Updated category label
    pub category: Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Updated street address
    pub address: Option<String>,
    /// Updated road-name address
    pub road_address: Option<String>,
    /// Updated latitude
    pub latitude: Option<f64>,
    /// Updated longitude
    pub longitude: Option<f64>,
    /// Updated phone number
    pub phone_number: Option<String>,
    /// Updated website URL
    pub website: Option<String>,
    /// Updated rating
    pub rating: Option<f64>,
    /// Updated verification flag
    pub is_verified: Option<bool>,
}

/// Parameters for creating a new travel plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTravelPlan {
    /// Owning user (required, must exist)
    pub user_id: u64,
    /// Title of the plan (required)
    pub title: String,
    /// Longer description
    pub description: Option<String>,
    /// Destination label (required)
    pub destination: String,
    /// First day of the trip, inclusive
    pub start_date: Date,
    /// Last day of the trip, inclusive
    pub end_date: Date,
    /// Party size
    pub number_of_people: Option<i32>,
    /// Planned budget
    pub budget: Option<f64>,
    /// Initial lifecycle status
    #[serde(default)]
    pub status: PlanStatus,
    /// Whether the plan is visible in public search
    #[serde(default)]
    pub is_public: bool,
    /// Whether the plan was generated by an AI assistant
    #[serde(default)]
    pub is_ai_generated: bool,
    /// Cover image URL
    pub cover_image_url: Option<String>,
    /// Initial preference map
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    /// Initial tag set
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Parameters for updating an existing travel plan's scalar fields.
///
/// Tags, preferences, and collaborators are replaced wholesale through their
/// dedicated operations instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTravelPlan {
    /// Plan ID to update (required)
    pub id: u64,
    /// Version the caller last read; the update fails on mismatch
    pub expected_version: i64,
    /// Updated title
    pub title: Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Updated destination label
    pub destination: Option<String>,
    /// Updated first day of the trip
    pub start_date: Option<Date>,
    /// Updated last day of the trip
    pub end_date: Option<Date>,
    /// Updated party size
    pub number_of_people: Option<i32>,
    /// Updated budget
    pub budget: Option<f64>,
    /// Updated lifecycle status
    pub status: Option<PlanStatus>,
    /// Updated public-visibility flag
    pub is_public: Option<bool>,
    /// Updated cover image URL
    pub cover_image_url: Option<String>,
}

/// Parameters for adding an itinerary item to a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItineraryItem {
    /// Owning travel plan (required, must exist)
    pub travel_plan_id: u64,
    /// Optional referenced place
    pub place_id: Option<u64>,
    /// 1-based day of the trip
    pub day_number: i32,
    /// Position within the day; (plan, day, sequence) must be unique
    pub sequence: i32,
    /// Short label for the entry
    pub title: Option<String>,
    /// Longer description
    pub description: Option<String>,
    /// Scheduled start (UTC)
    pub start_time: Option<Timestamp>,
    /// Scheduled end (UTC)
    pub end_time: Option<Timestamp>,
    /// Estimated cost
    pub estimated_cost: Option<f64>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Parameters for updating an existing itinerary item.
///
/// Moving an item to a (day, sequence) slot already taken within its plan
/// fails with a constraint violation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItineraryItem {
    /// Item ID to update (required)
    pub id: u64,
    /// Updated place reference
    pub place_id: Option<u64>,
    /// Updated day number
    pub day_number: Option<i32>,
    /// Updated sequence within the day
    pub sequence: Option<i32>,
    /// Updated label
    pub title: Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Updated scheduled start
    pub start_time: Option<Timestamp>,
    /// Updated scheduled end
    pub end_time: Option<Timestamp>,
    /// Updated estimated cost
    pub estimated_cost: Option<f64>,
    /// Updated notes
    pub notes: Option<String>,
}
