//! Stamp Models
//!
//! A stamp is one unit of progress toward a reward card's stage thresholds.
//! Stamps are generated with the card and individually activated via their
//! own single-use code; activation is the only mutation.

use serde::{Deserialize, Serialize};

/// Stamp entity (owned by exactly one reward card)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Stamp {
    pub id: i64,
    pub card_id: i64,
    /// Position within the card's stamp set (0-based)
    pub position: i64,
    /// Activation code, unique within the card
    pub code: String,
    /// Monotonic: false → true exactly once
    pub is_active: bool,
    /// User who activated the stamp; never cleared
    pub activated_by: Option<String>,
    pub activated_at: Option<i64>,
}

/// Stamp activation payload (customer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateStampRequest {
    pub card_id: i64,
    pub code: String,
}
