//! Unified error codes for the loyalty ledger
//!
//! This module defines all error codes used across the server and its
//! clients. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Identity errors
//! - 4xxx: Card errors
//! - 5xxx: Stamp errors
//! - 6xxx: Redemption errors
//! - 7xxx: Wallet errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid operation parameters
    InvalidParameters = 6,

    // ==================== 1xxx: Identity ====================
    /// Caller did not supply an identity
    NotAuthenticated = 1001,
    /// Administrator role is required
    AdminRequired = 1002,

    // ==================== 4xxx: Card ====================
    /// Card not found
    CardNotFound = 4001,
    /// Card is past its expiry date or was deactivated
    CardExpired = 4002,
    /// Card is already owned by another user
    CardAlreadyOwned = 4003,
    /// Card is not owned by the calling user
    CardNotOwned = 4004,
    /// Card has already been used
    CardAlreadyUsed = 4005,
    /// Card type does not support the requested action
    CardNotApplicable = 4006,

    // ==================== 5xxx: Stamp ====================
    /// Stamp not found on this card
    StampNotFound = 5001,
    /// Stamp code has already been activated
    StampAlreadyActivated = 5002,
    /// Not enough active stamps for the requested reward
    InsufficientStamps = 5003,

    // ==================== 6xxx: Redemption ====================
    /// Stage does not exist on this card
    StageNotFound = 6001,
    /// Stage threshold has not been reached
    StageNotEligible = 6002,
    /// Stage has already been redeemed
    StageAlreadyRedeemed = 6003,

    // ==================== 7xxx: Wallet ====================
    /// Wallet balance is insufficient
    WalletInsufficientBalance = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidParameters => "Invalid operation parameters",

            // Identity
            ErrorCode::NotAuthenticated => "Caller identity is missing",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Card
            ErrorCode::CardNotFound => "Card not found",
            ErrorCode::CardExpired => "Card has expired",
            ErrorCode::CardAlreadyOwned => "Card is already owned by another user",
            ErrorCode::CardNotOwned => "Card is not owned by this user",
            ErrorCode::CardAlreadyUsed => "Card has already been used",
            ErrorCode::CardNotApplicable => "Card does not support this action",

            // Stamp
            ErrorCode::StampNotFound => "Stamp not found",
            ErrorCode::StampAlreadyActivated => "Stamp code has already been activated",
            ErrorCode::InsufficientStamps => "Not enough active stamps",

            // Redemption
            ErrorCode::StageNotFound => "Reward stage not found",
            ErrorCode::StageNotEligible => "Reward stage threshold not reached",
            ErrorCode::StageAlreadyRedeemed => "Reward stage has already been redeemed",

            // Wallet
            ErrorCode::WalletInsufficientBalance => "Insufficient wallet balance",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidParameters),

            // Identity
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::AdminRequired),

            // Card
            4001 => Ok(ErrorCode::CardNotFound),
            4002 => Ok(ErrorCode::CardExpired),
            4003 => Ok(ErrorCode::CardAlreadyOwned),
            4004 => Ok(ErrorCode::CardNotOwned),
            4005 => Ok(ErrorCode::CardAlreadyUsed),
            4006 => Ok(ErrorCode::CardNotApplicable),

            // Stamp
            5001 => Ok(ErrorCode::StampNotFound),
            5002 => Ok(ErrorCode::StampAlreadyActivated),
            5003 => Ok(ErrorCode::InsufficientStamps),

            // Redemption
            6001 => Ok(ErrorCode::StageNotFound),
            6002 => Ok(ErrorCode::StageNotEligible),
            6003 => Ok(ErrorCode::StageAlreadyRedeemed),

            // Wallet
            7001 => Ok(ErrorCode::WalletInsufficientBalance),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            other => Err(InvalidErrorCode(other)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::InvalidParameters,
            ErrorCode::CardNotFound,
            ErrorCode::CardAlreadyOwned,
            ErrorCode::StampAlreadyActivated,
            ErrorCode::StageAlreadyRedeemed,
            ErrorCode::WalletInsufficientBalance,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn test_serialize_as_u16() {
        let json = serde_json::to_string(&ErrorCode::CardExpired).unwrap();
        assert_eq!(json, "4002");
        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::StampAlreadyActivated);
    }
}
