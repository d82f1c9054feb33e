//! Card Application
//!
//! The seam between the loyalty core and the checkout subsystem: validates
//! a card against the calling user and folds its effect into an order
//! draft. Checkout supplies the draft and applies the returned effect; the
//! core never stores order totals.

use sqlx::SqlitePool;

use crate::db::repository::{card, redemption, stamp, wallet};
use crate::loyalty::redemption::eligible_stage;
use crate::loyalty::registry::CardRegistry;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    AppliedEffect, Card, CardAction, CardStatus, CardVariant, OrderDraft, RewardKind,
};
use shared::util::now_millis;

#[derive(Clone)]
pub struct CardApplication {
    pool: SqlitePool,
    registry: CardRegistry,
}

impl CardApplication {
    pub fn new(pool: SqlitePool) -> Self {
        let registry = CardRegistry::new(pool.clone());
        Self { pool, registry }
    }

    /// Apply a card to an order draft.
    ///
    /// A card that is unowned is claimed for the caller as part of the
    /// apply; a card owned by someone else is rejected. Single-use
    /// consumption shares the compare-and-set transitions of the
    /// repository, so a card can be applied to at most one order.
    pub async fn apply_card(
        &self,
        order: &OrderDraft,
        code: &str,
        user_id: &str,
        action: CardAction,
    ) -> AppResult<AppliedEffect> {
        let found = self.registry.find_by_code(code).await?;
        if found.is_expired_at(now_millis()) {
            return Err(AppError::new(ErrorCode::CardExpired));
        }

        match action {
            CardAction::Collect => {
                if !matches!(found.variant, CardVariant::Reward { .. }) {
                    return Err(AppError::new(ErrorCode::CardNotApplicable));
                }
                let owned = self.ensure_claimed(found, user_id).await?;
                self.collect(&owned).await
            }
            CardAction::Redeem => {
                if !matches!(found.variant, CardVariant::Reward { .. }) {
                    return Err(AppError::new(ErrorCode::CardNotApplicable));
                }
                let owned = self.ensure_claimed(found, user_id).await?;
                self.redeem_eligible(order, &owned, user_id).await
            }
            CardAction::UseGift => {
                if !matches!(found.variant, CardVariant::Gift { .. }) {
                    return Err(AppError::new(ErrorCode::CardNotApplicable));
                }
                let owned = self.ensure_claimed(found, user_id).await?;
                self.use_gift(order, &owned).await
            }
            CardAction::UseCoins => {
                let CardVariant::Coins { value } = &found.variant else {
                    // Wrong card type for the requested action
                    return Err(AppError::new(ErrorCode::CardNotApplicable));
                };
                let value = *value;
                self.use_coins(found, value, user_id).await
            }
        }
    }

    /// Issue the next stamp code alongside the order (no total effect).
    async fn collect(&self, owned: &Card) -> AppResult<AppliedEffect> {
        if owned.status == CardStatus::Used {
            return Err(AppError::new(ErrorCode::CardAlreadyUsed));
        }
        let next = stamp::first_inactive(&self.pool, owned.id)
            .await?
            .ok_or_else(|| {
                AppError::invalid_request("All stamp codes on this card are already active")
            })?;
        Ok(AppliedEffect::StampCode {
            card_id: owned.id,
            code: next.code,
        })
    }

    /// Redeem the card's currently eligible stage into the order.
    async fn redeem_eligible(
        &self,
        order: &OrderDraft,
        owned: &Card,
        user_id: &str,
    ) -> AppResult<AppliedEffect> {
        let CardVariant::Reward { stages } = &owned.variant else {
            return Err(AppError::new(ErrorCode::CardNotApplicable));
        };

        let redeemed = redemption::redeemed_stages(&self.pool, owned.id).await?;
        let active = stamp::active_count(&self.pool, owned.id).await?;
        let stage_index = eligible_stage(stages, &redeemed, active)
            .ok_or_else(|| AppError::new(ErrorCode::InsufficientStamps))?;

        let engine = crate::loyalty::RedemptionEngine::new(self.pool.clone());
        let result = engine.redeem(owned.id, stage_index, user_id).await?;

        match result.reward_kind {
            RewardKind::Gift => Ok(AppliedEffect::FreeItem {
                card_id: owned.id,
                description: result.reward,
            }),
            RewardKind::Discount => {
                let percent = result.discount_value.unwrap_or(0);
                Ok(discount_effect(owned.id, percent, order.subtotal))
            }
        }
    }

    /// Consume a gift card: `ACTIVE → USED` exactly once, then fold the
    /// discount or free item into the order.
    async fn use_gift(&self, order: &OrderDraft, owned: &Card) -> AppResult<AppliedEffect> {
        let CardVariant::Gift {
            gift_kind,
            discount_value,
            ..
        } = &owned.variant
        else {
            return Err(AppError::new(ErrorCode::CardNotApplicable));
        };

        if !card::try_mark_used(&self.pool, owned.id).await? {
            return Err(AppError::new(ErrorCode::CardAlreadyUsed));
        }
        tracing::info!(card_id = owned.id, "Gift card used");

        match gift_kind {
            RewardKind::Gift => Ok(AppliedEffect::FreeItem {
                card_id: owned.id,
                description: owned.title.clone(),
            }),
            RewardKind::Discount => {
                let percent = discount_value.unwrap_or(0);
                Ok(discount_effect(owned.id, percent, order.subtotal))
            }
        }
    }

    /// Consume a coins card into the caller's wallet. The claim path
    /// already credits and consumes atomically, so an owned card here means
    /// the credit has happened.
    async fn use_coins(&self, found: Card, value: i64, user_id: &str) -> AppResult<AppliedEffect> {
        match &found.owner_id {
            None => {
                let claimed = self.registry.claim_card(&found.code, user_id).await?;
                let balance = wallet::balance(&self.pool, user_id).await?;
                Ok(AppliedEffect::CoinsCredit {
                    card_id: claimed.id,
                    amount: value,
                    balance,
                })
            }
            Some(owner) if owner == user_id => Err(AppError::new(ErrorCode::CardAlreadyUsed)),
            Some(_) => Err(AppError::new(ErrorCode::CardAlreadyOwned)),
        }
    }

    /// Claim the card for the caller when unowned; reject when owned by
    /// someone else.
    async fn ensure_claimed(&self, found: Card, user_id: &str) -> AppResult<Card> {
        match &found.owner_id {
            Some(owner) if owner == user_id => Ok(found),
            Some(_) => Err(AppError::new(ErrorCode::CardAlreadyOwned)),
            None => self.registry.claim_card(&found.code, user_id).await,
        }
    }
}

fn discount_effect(card_id: i64, percent: i64, subtotal: f64) -> AppliedEffect {
    let amount = (subtotal * percent as f64 / 100.0 * 100.0).round() / 100.0;
    AppliedEffect::Discount {
        card_id,
        percent,
        amount,
        total: ((subtotal - amount) * 100.0).round() / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_effect_rounds_to_cents() {
        let effect = discount_effect(1, 15, 9.99);
        match effect {
            AppliedEffect::Discount {
                percent,
                amount,
                total,
                ..
            } => {
                assert_eq!(percent, 15);
                assert_eq!(amount, 1.50);
                assert_eq!(total, 8.49);
            }
            _ => panic!("expected discount effect"),
        }
    }

    #[test]
    fn test_discount_effect_full_percent() {
        let effect = discount_effect(1, 100, 42.0);
        match effect {
            AppliedEffect::Discount { amount, total, .. } => {
                assert_eq!(amount, 42.0);
                assert_eq!(total, 0.0);
            }
            _ => panic!("expected discount effect"),
        }
    }
}
