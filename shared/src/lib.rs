//! Shared types for the loyalty ledger
//!
//! Common types used across crates: the card/stamp/wallet domain models,
//! the unified error system, API response structures, and ID/time
//! utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
