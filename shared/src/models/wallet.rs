//! Wallet Models
//!
//! Coin balance per user, with every movement recorded as a transaction row.
//! The loyalty core only emits credit/debit instructions; payment settlement
//! itself happens upstream.

use serde::{Deserialize, Serialize};

/// Transaction direction/source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum WalletTxKind {
    /// Credit from a coins-card activation
    CardCredit,
    /// Debit for a coin-based payment
    Payment,
}

/// Wallet account row (one per user, created lazily on first credit)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WalletAccount {
    pub user_id: String,
    pub balance: i64,
    pub updated_at: i64,
}

/// Wallet movement record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WalletTransaction {
    pub id: i64,
    pub user_id: String,
    /// Positive for credits, negative for debits
    pub amount: i64,
    pub kind: WalletTxKind,
    /// Card that produced this movement, if any
    pub card_id: Option<i64>,
    pub note: Option<String>,
    pub created_at: i64,
}

/// Balance response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub user_id: String,
    pub balance: i64,
}

/// Coin payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletPayRequest {
    /// Amount of coins to spend, positive
    pub amount: i64,
    pub order_id: Option<String>,
}
