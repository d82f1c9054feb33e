//! Card Registry
//!
//! Creates, stores and looks up cards by id or code; enforces code
//! uniqueness and the one-owner-at-a-time claim rule. Batch creation is
//! all-or-nothing: either every card in the request lands with a valid
//! unique code, or none do.

use sqlx::SqlitePool;

use crate::db::repository::{RepoError, card, stamp};
use crate::loyalty::{codes, ledger};
use crate::utils::{AppError, AppResult, ErrorCode};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_TITLE_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};
use shared::models::{
    Card, CardBatchCreate, CardDetail, CardRecord, CardStatus, CardType, CardVariant, RewardKind,
    RewardStage, StageInput,
};
use shared::util::{now_millis, snowflake_id};

/// Upper bound for one batch creation request
const MAX_BATCH_SIZE: u32 = 500;

/// Attempts to find an unused code before giving up
const MAX_CODE_ATTEMPTS: usize = 16;

/// Attempts to land a batch when an insert races another creator
const MAX_INSERT_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct CardRegistry {
    pool: SqlitePool,
}

impl CardRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create `count` cards sharing the supplied template, each with its own
    /// unique code (and stamp set, for reward cards).
    pub async fn create_cards(&self, payload: CardBatchCreate) -> AppResult<Vec<Card>> {
        self.validate_batch(&payload)?;

        for attempt in 0..MAX_INSERT_ATTEMPTS {
            let batch = self.prepare_batch(&payload).await?;
            match card::insert_batch(&self.pool, &batch).await {
                Ok(cards) => {
                    tracing::info!(
                        count = cards.len(),
                        card_type = ?payload.card_type,
                        "Card batch created"
                    );
                    return Ok(cards);
                }
                // Another creator landed one of our codes first; regenerate
                Err(RepoError::Duplicate(what)) => {
                    tracing::warn!(attempt, %what, "Card code collision, regenerating batch");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal("Could not allocate unique card codes"))
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Card> {
        card::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::CardNotFound, format!("Card {id} not found")))
    }

    pub async fn find_by_code(&self, code: &str) -> AppResult<Card> {
        card::find_by_code(&self.pool, code)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CardNotFound))
    }

    /// Claim a card by code for `user_id`.
    ///
    /// First successful claim wins; reclaiming by the same user is a no-op
    /// success. Claiming a coins card credits the owner's wallet and
    /// consumes the card in the same transaction.
    pub async fn claim_card(&self, code: &str, user_id: &str) -> AppResult<Card> {
        validate_required_text(user_id, "user id", MAX_SHORT_TEXT_LEN)?;

        let found = self.find_by_code(code).await?;
        if found.is_expired_at(now_millis()) {
            return Err(AppError::new(ErrorCode::CardExpired));
        }

        match &found.owner_id {
            Some(owner) if owner == user_id => {
                if found.status == CardStatus::Used {
                    return Err(AppError::new(ErrorCode::CardAlreadyUsed));
                }
                // Idempotent reclaim
                Ok(found)
            }
            Some(_) => Err(AppError::new(ErrorCode::CardAlreadyOwned)),
            None => {
                if found.status == CardStatus::Used {
                    return Err(AppError::new(ErrorCode::CardAlreadyUsed));
                }
                let claimed = match &found.variant {
                    CardVariant::Coins { value } => {
                        match card::claim_coins(&self.pool, found.id, user_id, *value).await? {
                            Some(balance) => {
                                tracing::info!(
                                    card_id = found.id,
                                    user_id,
                                    value,
                                    balance,
                                    "Coins card activated"
                                );
                                true
                            }
                            None => false,
                        }
                    }
                    _ => card::try_claim(&self.pool, found.id, user_id).await?,
                };

                if claimed {
                    tracing::info!(card_id = found.id, user_id, "Card claimed");
                    return self.find_by_id(found.id).await;
                }

                // Lost the race: classify against the winner's state
                let current = self.find_by_id(found.id).await?;
                match &current.owner_id {
                    Some(owner) if owner == user_id => Ok(current),
                    Some(_) => Err(AppError::new(ErrorCode::CardAlreadyOwned)),
                    None if current.status == CardStatus::Used => {
                        Err(AppError::new(ErrorCode::CardAlreadyUsed))
                    }
                    None => Err(AppError::new(ErrorCode::CardExpired)),
                }
            }
        }
    }

    /// Force-expire a card (admin). No-op success when already terminal.
    pub async fn deactivate(&self, card_id: i64) -> AppResult<()> {
        card::deactivate(&self.pool, card_id).await?;
        tracing::info!(card_id, "Card deactivated");
        Ok(())
    }

    /// Hard removal (admin).
    pub async fn delete(&self, card_id: i64) -> AppResult<()> {
        card::delete(&self.pool, card_id).await?;
        tracing::info!(card_id, "Card deleted");
        Ok(())
    }

    pub async fn list(
        &self,
        status: Option<CardStatus>,
        card_type: Option<CardType>,
    ) -> AppResult<Vec<Card>> {
        Ok(card::list(&self.pool, status, card_type).await?)
    }

    /// Card with its stamp set (admin detail view)
    pub async fn detail(&self, card_id: i64) -> AppResult<CardDetail> {
        let found = self.find_by_id(card_id).await?;
        let stamps = stamp::find_by_card(&self.pool, card_id).await?;
        Ok(CardDetail {
            card: found,
            stamps,
        })
    }

    pub async fn cards_for_owner(&self, user_id: &str) -> AppResult<Vec<Card>> {
        Ok(card::find_by_owner(&self.pool, user_id).await?)
    }

    // ==================== batch preparation ====================

    fn validate_batch(&self, payload: &CardBatchCreate) -> AppResult<()> {
        if payload.count == 0 {
            return Err(AppError::invalid_parameters("count must be at least 1"));
        }
        if payload.count > MAX_BATCH_SIZE {
            return Err(AppError::invalid_parameters(format!(
                "count must not exceed {MAX_BATCH_SIZE}"
            )));
        }

        validate_required_text(&payload.title, "title", MAX_TITLE_LEN)?;
        validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
        validate_optional_text(&payload.background_color, "background color", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&payload.text_color, "text color", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&payload.image_url, "image url", MAX_URL_LEN)?;

        if let Some(expires_at) = payload.expires_at
            && expires_at <= now_millis()
        {
            return Err(AppError::invalid_parameters("expiry date is in the past"));
        }

        match payload.card_type {
            CardType::Reward => {
                let stages = payload
                    .stages
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        AppError::invalid_parameters("reward card requires at least one stage")
                    })?;
                validate_stages(stages)?;
            }
            CardType::Gift => {
                let gift_kind = payload.gift_kind.ok_or_else(|| {
                    AppError::invalid_parameters("gift card requires gift_kind")
                })?;
                if gift_kind == RewardKind::Discount {
                    validate_discount(payload.discount_value)?;
                }
            }
            CardType::Coins => {
                let value = payload.coin_value.ok_or_else(|| {
                    AppError::invalid_parameters("coins card requires coin_value")
                })?;
                if value <= 0 {
                    return Err(AppError::invalid_parameters("coin_value must be positive"));
                }
            }
        }

        Ok(())
    }

    /// Generate codes and flat records for the whole batch.
    async fn prepare_batch(&self, payload: &CardBatchCreate) -> AppResult<Vec<card::NewCard>> {
        let mut taken = std::collections::HashSet::new();
        let mut batch = Vec::with_capacity(payload.count as usize);

        let stages: Vec<RewardStage> = match payload.card_type {
            CardType::Reward => payload
                .stages
                .as_deref()
                .unwrap_or_default()
                .iter()
                .enumerate()
                .map(|(i, s)| RewardStage {
                    stage_index: i as i64,
                    required: s.required,
                    reward: s.reward.clone(),
                    reward_kind: s.reward_kind,
                    discount_value: s.discount_value,
                })
                .collect(),
            _ => Vec::new(),
        };
        let stamp_count = ledger::stamps_needed(&stages);

        for _ in 0..payload.count {
            let code = self.unique_code(payload.card_type, &mut taken).await?;
            let now = now_millis();
            let record = CardRecord {
                id: snowflake_id(),
                code,
                card_type: payload.card_type,
                status: CardStatus::Active,
                title: payload.title.clone(),
                description: payload.description.clone(),
                owner_id: None,
                expires_at: payload.expires_at,
                background_color: payload.background_color.clone(),
                text_color: payload.text_color.clone(),
                gift_kind: payload.gift_kind,
                discount_value: payload.discount_value,
                image_url: payload.image_url.clone(),
                coin_value: payload.coin_value,
                created_at: now,
                updated_at: now,
            };
            batch.push(card::NewCard {
                record,
                stages: stages.clone(),
                stamp_codes: codes::stamp_codes(stamp_count as usize),
            });
        }

        Ok(batch)
    }

    /// Pick a code that is neither stored nor already used in this batch.
    async fn unique_code(
        &self,
        card_type: CardType,
        taken: &mut std::collections::HashSet<String>,
    ) -> AppResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = codes::card_code(card_type);
            if taken.contains(&candidate) {
                continue;
            }
            if !card::code_exists(&self.pool, &candidate).await? {
                taken.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(AppError::internal("Could not allocate a unique card code"))
    }
}

fn validate_stages(stages: &[StageInput]) -> AppResult<()> {
    let mut previous = 0i64;
    for (index, stage) in stages.iter().enumerate() {
        if stage.required <= 0 {
            return Err(AppError::invalid_parameters(format!(
                "stage {index}: required must be positive"
            )));
        }
        if stage.required <= previous {
            return Err(AppError::invalid_parameters(format!(
                "stage {index}: thresholds must strictly increase"
            )));
        }
        if stage.reward.trim().is_empty() {
            return Err(AppError::invalid_parameters(format!(
                "stage {index}: reward description must not be empty"
            )));
        }
        if stage.reward_kind == RewardKind::Discount {
            validate_discount(stage.discount_value)
                .map_err(|e| AppError::invalid_parameters(format!("stage {index}: {}", e.message)))?;
        }
        previous = stage.required;
    }
    Ok(())
}

fn validate_discount(value: Option<i64>) -> AppResult<()> {
    match value {
        Some(v) if (1..=100).contains(&v) => Ok(()),
        Some(_) => Err(AppError::invalid_parameters(
            "discount_value must be between 1 and 100",
        )),
        None => Err(AppError::invalid_parameters("discount_value is required")),
    }
}
