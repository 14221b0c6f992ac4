//! Error types for the integrity store.
//!
//! [`StoreError`] is the primary error type returned by all store operations.
//! Validation, conflict, and reference failures are separate variants so
//! callers can map them to distinct outcomes; storage-level failures keep
//! their source error attached.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// A field failed format validation.
    #[error("validation failed: {field}: {message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Uniqueness violation, or a delete blocked by dependent rows.
    #[error("{0}")]
    Conflict(String),

    /// A supplied foreign key does not resolve.
    #[error("{entity} com ID {id} não encontrado(a)")]
    ReferenceNotFound {
        /// Referenced entity kind.
        entity: &'static str,
        /// The id that failed to resolve.
        id: i64,
    },

    /// The operation target does not exist.
    #[error("{entity} com ID {id} não encontrado(a)")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// The missing id.
        id: i64,
    },
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Map a storage-level uniqueness violation to [`StoreError::Conflict`].
///
/// Pre-checks run before every insert/update, but the unique index is the
/// final authority under concurrency — a constraint violation that slips
/// past the pre-check is still a conflict, not a storage failure.
pub fn map_unique_violation(err: rusqlite::Error, message: impl Into<String>) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict(message.into())
        }
        other => StoreError::Sqlite(other),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
