//! Database operations and SQLite management for the travel store.
//!
//! This module provides low-level database operations for the Wayfarer
//! travel store. It handles SQLite database connections, schema management,
//! and provides specialized query interfaces for users, places, travel plans,
//! itinerary items, and saved plans.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod itinerary_queries;
pub mod migrations;
pub mod place_queries;
pub mod saved_plan_queries;
pub mod travel_plan_queries;
pub mod user_queries;
pub mod utils;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
