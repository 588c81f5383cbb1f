//! Error types for the storage layer.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness or required-field invariant was violated.
    /// Never retried automatically; the write was rejected before commit.
    #[error("Constraint violation: {constraint}")]
    Constraint {
        constraint: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Optimistic-lock failure: the row's persisted version no longer matches
    /// the version the caller read. The caller must re-read and retry.
    #[error("Version conflict on {entity} {id}: expected version {expected}")]
    VersionConflict {
        entity: &'static str,
        id: u64,
        expected: i64,
    },
    /// A mutation referenced a row that does not exist. Plain lookups report
    /// absence as `Ok(None)` instead.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    /// The underlying store is busy or locked. Distinct from `Database` so
    /// callers can apply backoff.
    #[error("Store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl StoreError {
    /// Classifies a raw sqlite error into the store taxonomy.
    ///
    /// Constraint failures (unique, not-null, foreign-key) become
    /// [`StoreError::Constraint`] carrying sqlite's constraint description;
    /// busy/locked become [`StoreError::Unavailable`]; everything else is a
    /// generic [`StoreError::Database`].
    pub(crate) fn from_sqlite(message: &str, source: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref code, ref detail) = source {
            match code.code {
                rusqlite::ErrorCode::ConstraintViolation => {
                    let constraint = detail.clone().unwrap_or_else(|| message.to_string());
                    return StoreError::Constraint { constraint, source };
                }
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    return StoreError::Unavailable {
                        message: message.to_string(),
                        source,
                    };
                }
                _ => {}
            }
        }
        StoreError::Database {
            message: message.to_string(),
            source,
        }
    }

    /// Creates a new database error with additional context.
    pub fn database_error(message: &str, source: rusqlite::Error) -> Self {
        Self::from_sqlite(message, source)
    }

    /// Creates an input validation error for a field.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Extension trait for database-related Results providing concise error
/// mapping with message context.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message, classifying the sqlite error into
    /// the store taxonomy.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| StoreError::from_sqlite(message, e))
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_errors_are_classified() {
        let ffi = rusqlite::ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
        };
        let raw = rusqlite::Error::SqliteFailure(
            ffi,
            Some("UNIQUE constraint failed: users.email".to_string()),
        );
        match StoreError::from_sqlite("Failed to insert user", raw) {
            StoreError::Constraint { constraint, .. } => {
                assert!(constraint.contains("users.email"));
            }
            other => panic!("Expected Constraint, got {other:?}"),
        }
    }

    #[test]
    fn busy_errors_are_unavailable() {
        let ffi = rusqlite::ffi::Error {
            code: rusqlite::ErrorCode::DatabaseBusy,
            extended_code: rusqlite::ffi::SQLITE_BUSY,
        };
        let raw = rusqlite::Error::SqliteFailure(ffi, None);
        match StoreError::from_sqlite("Failed to commit", raw) {
            StoreError::Unavailable { message, .. } => assert_eq!(message, "Failed to commit"),
            other => panic!("Expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn other_errors_stay_database() {
        let raw = rusqlite::Error::QueryReturnedNoRows;
        match StoreError::from_sqlite("Failed to query", raw) {
            StoreError::Database { message, .. } => assert_eq!(message, "Failed to query"),
            other => panic!("Expected Database, got {other:?}"),
        }
    }
}
