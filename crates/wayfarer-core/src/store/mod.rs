//! High-level async store API for the travel data model.
//!
//! This module provides the main [`Store`] interface for interacting with
//! the Wayfarer travel store. The store coordinates between callers and the
//! database layer, exposing the full set of user, place, travel plan,
//! itinerary, and saved-plan operations as async methods.
//!
//! Each operation opens its own database connection and runs on the blocking
//! thread pool, so operations are independent transactional units: an error
//! in one never leaves another half-applied.
//!
//! # Usage
//!
//! ```rust
//! use wayfarer_core::{StoreBuilder, params::NewUser};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("/tmp/wayfarer.db"))
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
//! assert_eq!(user.version, 0);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod builder;
pub mod itinerary_ops;
pub mod place_ops;
pub mod plan_ops;
pub mod saved_plan_ops;
pub mod user_ops;

pub use builder::StoreBuilder;

/// Main store interface for the travel data model.
pub struct Store {
    pub(crate) db_path: PathBuf,
}

impl Store {
    /// Creates a new store with the specified database path.
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}
