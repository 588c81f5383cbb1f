//! Status enumeration for travel plans.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of travel plan statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Plan is being drafted and not yet committed to
    #[default]
    Draft,

    /// Plan is confirmed and scheduled
    Confirmed,

    /// The trip is currently underway
    InProgress,

    /// The trip has finished
    Completed,

    /// Plan was cancelled before or during the trip
    Cancelled,
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PlanStatus::Draft),
            "confirmed" => Ok(PlanStatus::Confirmed),
            "in_progress" | "inprogress" => Ok(PlanStatus::InProgress),
            "completed" => Ok(PlanStatus::Completed),
            "cancelled" => Ok(PlanStatus::Cancelled),
            _ => Err(format!("Invalid plan status: {s}")),
        }
    }
}

impl PlanStatus {
    /// Convert to the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "draft",
            PlanStatus::Confirmed => "confirmed",
            PlanStatus::InProgress => "in_progress",
            PlanStatus::Completed => "completed",
            PlanStatus::Cancelled => "cancelled",
        }
    }
}
