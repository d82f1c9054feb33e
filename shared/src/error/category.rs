//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the error code range:
/// - 0xxx: General errors
/// - 1xxx: Identity errors
/// - 4xxx: Card errors
/// - 5xxx: Stamp errors
/// - 6xxx: Redemption errors
/// - 7xxx: Wallet errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Identity errors (1xxx)
    Identity,
    /// Card errors (4xxx)
    Card,
    /// Stamp errors (5xxx)
    Stamp,
    /// Redemption errors (6xxx)
    Redemption,
    /// Wallet errors (7xxx)
    Wallet,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Identity,
            4000..5000 => Self::Card,
            5000..6000 => Self::Stamp,
            6000..7000 => Self::Redemption,
            7000..8000 => Self::Wallet,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Identity => "identity",
            Self::Card => "card",
            Self::Stamp => "stamp",
            Self::Redemption => "redemption",
            Self::Wallet => "wallet",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
