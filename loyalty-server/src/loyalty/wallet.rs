//! Wallet Service
//!
//! Coin balance queries and coin-based payment. Credits come exclusively
//! from coins-card activation (see the registry); this service only reads
//! balances and executes debits.

use sqlx::SqlitePool;

use crate::db::repository::wallet;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{WalletBalance, WalletPayRequest, WalletTransaction};

#[derive(Clone)]
pub struct WalletService {
    pool: SqlitePool,
}

impl WalletService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn balance(&self, user_id: &str) -> AppResult<WalletBalance> {
        let balance = wallet::balance(&self.pool, user_id).await?;
        Ok(WalletBalance {
            user_id: user_id.to_string(),
            balance,
        })
    }

    pub async fn transactions(&self, user_id: &str) -> AppResult<Vec<WalletTransaction>> {
        Ok(wallet::transactions(&self.pool, user_id).await?)
    }

    /// Debit the caller's wallet for a coin payment.
    ///
    /// The overdraft guard lives in the conditional UPDATE, so two
    /// concurrent payments cannot spend the same coins twice.
    pub async fn pay(&self, user_id: &str, payload: WalletPayRequest) -> AppResult<WalletBalance> {
        if payload.amount <= 0 {
            return Err(AppError::invalid_parameters("amount must be positive"));
        }

        let balance = wallet::debit(
            &self.pool,
            user_id,
            payload.amount,
            payload.order_id.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::WalletInsufficientBalance))?;

        tracing::info!(user_id, amount = payload.amount, balance, "Coin payment");

        Ok(WalletBalance {
            user_id: user_id.to_string(),
            balance,
        })
    }
}
