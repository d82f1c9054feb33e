//! Redemption Engine
//!
//! Determines stage completion and performs redemption. A reward card's
//! progress state is derived from its active-stamp count and redemption
//! records, never stored: thresholds are cumulative, so the stage that is
//! redeemable right now is the highest satisfied one not yet redeemed.

use sqlx::SqlitePool;

use crate::db::repository::{card, redemption, stamp};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Card, CardProgress, CardVariant, RedemptionResult, RewardStage, StageProgress};
use shared::util::now_millis;

/// Derived progress state of a reward card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// Still collecting toward the next threshold
    Accumulating,
    /// The contained stage can be redeemed right now
    StageReady(i64),
    /// Every stage has been redeemed
    Exhausted,
}

/// Highest satisfied, not-yet-redeemed stage index
pub fn eligible_stage(stages: &[RewardStage], redeemed: &[i64], active: i64) -> Option<i64> {
    stages
        .iter()
        .filter(|s| active >= s.required && !redeemed.contains(&s.stage_index))
        .map(|s| s.stage_index)
        .max()
}

/// Derive the progress state from stamp count and redemption records
pub fn progress_state(stages: &[RewardStage], redeemed: &[i64], active: i64) -> ProgressState {
    if let Some(index) = eligible_stage(stages, redeemed, active) {
        ProgressState::StageReady(index)
    } else if !stages.is_empty() && redeemed.len() >= stages.len() {
        ProgressState::Exhausted
    } else {
        ProgressState::Accumulating
    }
}

#[derive(Clone)]
pub struct RedemptionEngine {
    pool: SqlitePool,
}

impl RedemptionEngine {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Progress summary for a reward card
    pub async fn progress(&self, reward_card: &Card) -> AppResult<CardProgress> {
        let CardVariant::Reward { stages } = &reward_card.variant else {
            return Err(AppError::new(ErrorCode::CardNotApplicable));
        };

        let active = stamp::active_count(&self.pool, reward_card.id).await?;
        let total = stamp::total_count(&self.pool, reward_card.id).await?;
        let redeemed = redemption::redeemed_stages(&self.pool, reward_card.id).await?;

        let stage_progress = stages
            .iter()
            .map(|s| StageProgress {
                stage_index: s.stage_index,
                required: s.required,
                reward: s.reward.clone(),
                reward_kind: s.reward_kind,
                discount_value: s.discount_value,
                redeemed: redeemed.contains(&s.stage_index),
                ready: active >= s.required && !redeemed.contains(&s.stage_index),
            })
            .collect();

        Ok(CardProgress {
            card_id: reward_card.id,
            active_stamps: active,
            total_stamps: total,
            eligible_stage: eligible_stage(stages, &redeemed, active),
            stages: stage_progress,
        })
    }

    /// Redeem one stage of a reward card.
    ///
    /// Idempotent per stage: the persisted redemption record makes a second
    /// redeem of the same stage fail instead of double-granting. Consumes
    /// the card when this was its last unredeemed stage.
    pub async fn redeem(
        &self,
        card_id: i64,
        stage_index: i64,
        user_id: &str,
    ) -> AppResult<RedemptionResult> {
        let reward_card = card::find_by_id(&self.pool, card_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CardNotFound))?;

        if reward_card.is_expired_at(now_millis()) {
            return Err(AppError::new(ErrorCode::CardExpired));
        }

        let CardVariant::Reward { stages } = &reward_card.variant else {
            return Err(AppError::new(ErrorCode::CardNotApplicable));
        };

        match &reward_card.owner_id {
            Some(owner) if owner == user_id => {}
            _ => return Err(AppError::new(ErrorCode::CardNotOwned)),
        }

        let stage = stages
            .iter()
            .find(|s| s.stage_index == stage_index)
            .ok_or_else(|| AppError::new(ErrorCode::StageNotFound))?;

        let active = stamp::active_count(&self.pool, card_id).await?;
        if active < stage.required {
            return Err(AppError::with_message(
                ErrorCode::StageNotEligible,
                format!(
                    "Stage {stage_index} needs {} active stamps, card has {active}",
                    stage.required
                ),
            ));
        }

        let landed = redemption::redeem(
            &self.pool,
            card_id,
            stage_index,
            user_id,
            stages.len() as i64,
        )
        .await?;
        if !landed {
            return Err(AppError::new(ErrorCode::StageAlreadyRedeemed));
        }

        tracing::info!(card_id, stage_index, user_id, "Stage redeemed");

        Ok(RedemptionResult {
            card_id,
            stage_index,
            reward: stage.reward.clone(),
            reward_kind: stage.reward_kind,
            discount_value: stage.discount_value,
        })
    }
}
