//! Stamp Ledger
//!
//! Manages the per-card stamp set of reward cards. Activation is the only
//! mutation: each stamp code is a single-use token representing one
//! verified purchase event, so a repeated activation is an error, never a
//! silent no-op.

use sqlx::SqlitePool;

use crate::db::repository::{card, stamp};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Card, CardVariant, RewardStage, Stamp};
use shared::util::now_millis;

/// Number of stamp slots a card needs: enough to reach the highest stage
/// threshold (thresholds are cumulative, so the maximum covers them all).
pub fn stamps_needed(stages: &[RewardStage]) -> i64 {
    stages.iter().map(|s| s.required).max().unwrap_or(0)
}

#[derive(Clone)]
pub struct StampLedger {
    pool: SqlitePool,
}

impl StampLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Activate one stamp by its code.
    ///
    /// The card must be claimed by `user_id` and not expired. The
    /// activation itself is a compare-and-set, so two concurrent attempts
    /// on the same code resolve to exactly one winner.
    pub async fn activate(&self, card_id: i64, code: &str, user_id: &str) -> AppResult<Stamp> {
        let owner_card = card::find_by_id(&self.pool, card_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CardNotFound))?;

        self.check_card(&owner_card, user_id)?;

        if stamp::try_activate(&self.pool, card_id, code, user_id).await? {
            let activated = stamp::find_by_code(&self.pool, card_id, code)
                .await?
                .ok_or_else(|| AppError::internal("Activated stamp disappeared"))?;
            tracing::info!(card_id, stamp_id = activated.id, user_id, "Stamp activated");
            return Ok(activated);
        }

        // Nothing changed: either the code is unknown or already consumed
        match stamp::find_by_code(&self.pool, card_id, code).await? {
            Some(_) => Err(AppError::new(ErrorCode::StampAlreadyActivated)),
            None => Err(AppError::new(ErrorCode::StampNotFound)),
        }
    }

    /// Active stamp count, the basis of all progress computations
    pub async fn active_count(&self, card_id: i64) -> AppResult<i64> {
        Ok(stamp::active_count(&self.pool, card_id).await?)
    }

    pub async fn stamps(&self, card_id: i64) -> AppResult<Vec<Stamp>> {
        Ok(stamp::find_by_card(&self.pool, card_id).await?)
    }

    /// Next stamp code to hand out with an order (lowest inactive position)
    pub async fn next_code(&self, card_id: i64) -> AppResult<Option<Stamp>> {
        Ok(stamp::first_inactive(&self.pool, card_id).await?)
    }

    fn check_card(&self, owner_card: &Card, user_id: &str) -> AppResult<()> {
        if owner_card.is_expired_at(now_millis()) {
            return Err(AppError::new(ErrorCode::CardExpired));
        }
        if !matches!(owner_card.variant, CardVariant::Reward { .. }) {
            return Err(AppError::new(ErrorCode::StampNotFound));
        }
        match &owner_card.owner_id {
            Some(owner) if owner == user_id => Ok(()),
            _ => Err(AppError::new(ErrorCode::CardNotOwned)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::RewardKind;

    fn stage(index: i64, required: i64) -> RewardStage {
        RewardStage {
            stage_index: index,
            required,
            reward: format!("reward {index}"),
            reward_kind: RewardKind::Gift,
            discount_value: None,
        }
    }

    #[test]
    fn test_stamps_needed_is_highest_threshold() {
        assert_eq!(stamps_needed(&[stage(0, 5)]), 5);
        assert_eq!(stamps_needed(&[stage(0, 3), stage(1, 8), stage(2, 12)]), 12);
    }

    #[test]
    fn test_stamps_needed_empty() {
        assert_eq!(stamps_needed(&[]), 0);
    }
}
