//! User model definition.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Represents a registered user.
///
/// Follower/following relationships are not carried on the record itself;
/// they live in a single edge table and are derived per direction through
/// `find_followers` / `find_following`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier for the user
    pub id: u64,

    /// Email address (unique, required)
    pub email: String,

    /// Handle (unique when present)
    pub username: Option<String>,

    /// Display name (required, not unique)
    pub nickname: String,

    /// Free-form profile text
    pub bio: Option<String>,

    /// Profile image URL
    pub profile_image_url: Option<String>,

    /// OAuth provider name (e.g. "google", "apple")
    pub provider: String,

    /// Provider-scoped account id; (provider, provider_id) is unique
    pub provider_id: String,

    /// General preference map
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,

    /// Travel-specific preference map
    #[serde(default)]
    pub travel_preferences: BTreeMap<String, String>,

    /// Whether the account is active (searchable)
    pub is_active: bool,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// Optimistic-lock version counter, incremented on every update
    pub version: i64,

    /// Timestamp when the user was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the user was last modified (UTC)
    pub updated_at: Timestamp,
}
