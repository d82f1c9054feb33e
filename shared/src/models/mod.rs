//! Domain models shared across crates
//!
//! Entities follow the storage row shape (`cfg_attr(feature = "db")` gates
//! the sqlx derives so client crates can use the models without pulling in
//! the database stack).

pub mod card;
pub mod order;
pub mod stamp;
pub mod wallet;

pub use card::{
    Card, CardBatchCreate, CardDetail, CardProgress, CardRecord, CardStatus, CardType,
    CardVariant, ClaimCardRequest, OwnedCard, RedeemStageRequest, Redemption, RedemptionResult,
    RewardKind, RewardStage, StageInput, StageProgress,
};
pub use order::{AppliedEffect, ApplyCardRequest, CardAction, OrderDraft, OrderLine};
pub use stamp::{ActivateStampRequest, Stamp};
pub use wallet::{WalletAccount, WalletBalance, WalletPayRequest, WalletTransaction, WalletTxKind};
