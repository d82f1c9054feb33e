//! Card Models
//!
//! The card is the central loyalty instrument: one of three variants
//! (reward / gift / coins), identified by a unique human-enterable code.
//! Storage rows are flat ([`CardRecord`]); the domain type ([`Card`]) carries
//! the variant as a tagged union so every consumer matches exhaustively.

use serde::{Deserialize, Serialize};

use super::stamp::Stamp;

/// Card variant discriminator (as stored)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CardType {
    Reward,
    Gift,
    Coins,
}

/// Stored card status
///
/// Transitions are monotonic: `Active → Used` and `Active → Expired`, both
/// terminal. Natural expiry is derived from `expires_at` at read time and is
/// not written back (lazy expiry).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CardStatus {
    Active,
    Used,
    Expired,
}

/// What a reward or gift grants: a free item or a percentage discount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RewardKind {
    Gift,
    Discount,
}

/// Reward stage definition (stored per reward card)
///
/// `required` is cumulative: stage thresholds strictly increase and are all
/// measured against the same active-stamp count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RewardStage {
    pub stage_index: i64,
    pub required: i64,
    pub reward: String,
    pub reward_kind: RewardKind,
    pub discount_value: Option<i64>,
}

/// Flat card row as stored
///
/// Variant-specific columns are nullable; [`Card`] is the assembled domain
/// view. Kept separate so the storage layer stays a plain row mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CardRecord {
    pub id: i64,
    pub code: String,
    pub card_type: CardType,
    pub status: CardStatus,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub expires_at: Option<i64>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub gift_kind: Option<RewardKind>,
    pub discount_value: Option<i64>,
    pub image_url: Option<String>,
    pub coin_value: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Type-specific card payload, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardVariant {
    Reward {
        stages: Vec<RewardStage>,
    },
    Gift {
        gift_kind: RewardKind,
        discount_value: Option<i64>,
        image_url: Option<String>,
    },
    Coins {
        value: i64,
    },
}

/// Card domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub status: CardStatus,
    pub owner_id: Option<String>,
    pub expires_at: Option<i64>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(flatten)]
    pub variant: CardVariant,
}

impl Card {
    /// Variant discriminator of this card
    pub fn card_type(&self) -> CardType {
        match &self.variant {
            CardVariant::Reward { .. } => CardType::Reward,
            CardVariant::Gift { .. } => CardType::Gift,
            CardVariant::Coins { .. } => CardType::Coins,
        }
    }

    /// Whether the card is expired at `now` — either force-expired (stored
    /// status) or naturally past `expires_at` (lazy expiry, never written
    /// back).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.status == CardStatus::Expired || self.expires_at.is_some_and(|e| now > e)
    }
}

/// Stage definition input for batch creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInput {
    pub required: i64,
    pub reward: String,
    pub reward_kind: RewardKind,
    pub discount_value: Option<i64>,
}

/// Batch card creation payload (admin)
///
/// All cards in the batch share the template; each card gets its own unique
/// code (and, for reward cards, its own stamp set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardBatchCreate {
    pub card_type: CardType,
    pub count: u32,
    pub title: String,
    pub description: Option<String>,
    pub expires_at: Option<i64>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    /// Reward cards: stage definitions in ascending threshold order
    pub stages: Option<Vec<StageInput>>,
    /// Gift cards: what the card grants
    pub gift_kind: Option<RewardKind>,
    /// Gift cards with `gift_kind = DISCOUNT`: percentage 1–100
    pub discount_value: Option<i64>,
    /// Gift cards: optional presentation asset
    pub image_url: Option<String>,
    /// Coins cards: wallet credit granted on activation
    pub coin_value: Option<i64>,
}

/// Claim-by-code payload (customer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimCardRequest {
    pub code: String,
}

/// Per-stage progress (for progress views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage_index: i64,
    pub required: i64,
    pub reward: String,
    pub reward_kind: RewardKind,
    pub discount_value: Option<i64>,
    pub redeemed: bool,
    pub ready: bool,
}

/// Reward card progress summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardProgress {
    pub card_id: i64,
    pub active_stamps: i64,
    pub total_stamps: i64,
    /// Highest satisfied, not-yet-redeemed stage (redeemable right now)
    pub eligible_stage: Option<i64>,
    pub stages: Vec<StageProgress>,
}

/// Card with progress (customer wallet view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedCard {
    #[serde(flatten)]
    pub card: Card,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<CardProgress>,
}

/// Card with its stamp set (admin detail view — exposes stamp codes for
/// out-of-band distribution)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDetail {
    #[serde(flatten)]
    pub card: Card,
    pub stamps: Vec<Stamp>,
}

/// Persisted stage redemption record
///
/// One row per redeemed stage; never deleted. Its existence is what makes
/// redemption idempotent per stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Redemption {
    pub id: i64,
    pub card_id: i64,
    pub stage_index: i64,
    pub redeemed_by: String,
    pub redeemed_at: i64,
}

/// Reward granted by a successful stage redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionResult {
    pub card_id: i64,
    pub stage_index: i64,
    pub reward: String,
    pub reward_kind: RewardKind,
    pub discount_value: Option<i64>,
}

/// Redeem-stage payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemStageRequest {
    pub stage_index: i64,
}
