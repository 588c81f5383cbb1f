//! Saved plan (bookmark) model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A user's bookmark of a travel plan.
///
/// Weak join entity: it references a user and a plan without owning either,
/// and at most one row exists per (user, plan) pair. Being a collaborator on
/// a plan and having it saved are independent relationships.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedPlan {
    /// Unique identifier for the bookmark
    pub id: u64,

    /// User who saved the plan
    pub user_id: u64,

    /// The saved travel plan
    pub travel_plan_id: u64,

    /// Timestamp when the bookmark was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the bookmark was last modified (UTC)
    pub updated_at: Timestamp,
}
