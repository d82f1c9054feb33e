//! Unified error system for the loyalty ledger
//!
//! This module provides a comprehensive error handling system with:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Identity errors
//! - 4xxx: Card errors
//! - 5xxx: Stamp errors
//! - 6xxx: Redemption errors
//! - 7xxx: Wallet errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::CardNotFound);
//!
//! // Create an error with custom message
//! let err = AppError::with_message(ErrorCode::CardExpired, "Card expired on 2025-06-01");
//!
//! // Create an error with details
//! let err = AppError::invalid_parameters("Stage threshold must be positive")
//!     .with_detail("field", "required");
//!
//! // Convert to API response
//! let response = ApiResponse::<()>::error(&err);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
