//! Repository Module
//!
//! CRUD and compare-and-set operations over the SQLite store.
//!
//! Every at-most-once transition (card claim, stamp activation, single-use
//! consumption, per-stage redemption) is a single conditional statement —
//! `UPDATE … WHERE <precondition>` or `INSERT … ON CONFLICT DO NOTHING` —
//! and callers branch on the reported row count. Concurrent callers racing
//! on the same card therefore observe each other strictly; there is no
//! separate read-check-write window.

pub mod card;
pub mod redemption;
pub mod stamp;
pub mod wallet;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Whether a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
