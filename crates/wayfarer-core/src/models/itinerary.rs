//! Itinerary item model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Represents a single entry within a travel plan's itinerary.
///
/// `(day_number, sequence)` defines a strict total order within a plan and is
/// unique per plan. The place reference is optional so that free-time entries
/// can exist without a location. Items are owned by their plan and cascade
/// with it on delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryItem {
    /// Unique identifier for the item
    pub id: u64,

    /// ID of the owning travel plan
    pub travel_plan_id: u64,

    /// Optional referenced place; None for free-time entries
    pub place_id: Option<u64>,

    /// 1-based day of the trip this item belongs to
    pub day_number: i32,

    /// Position within the day
    pub sequence: i32,

    /// Short label for the entry
    pub title: Option<String>,

    /// Longer description
    pub description: Option<String>,

    /// Scheduled start (UTC)
    pub start_time: Option<Timestamp>,

    /// Scheduled end (UTC)
    pub end_time: Option<Timestamp>,

    /// Estimated cost for this entry
    pub estimated_cost: Option<f64>,

    /// Free-form notes
    pub notes: Option<String>,

    /// Timestamp when the item was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the item was last modified (UTC)
    pub updated_at: Timestamp,
}
