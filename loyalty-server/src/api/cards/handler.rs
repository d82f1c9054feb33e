//! Cards API handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    Card, CardBatchCreate, CardDetail, CardProgress, CardStatus, CardType, CardVariant,
    ClaimCardRequest, OwnedCard, RedeemStageRequest, RedemptionResult,
};

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub status: Option<CardStatus>,
    pub card_type: Option<CardType>,
}

/// POST /api/cards - create a batch of cards (admin)
pub async fn create_batch(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CardBatchCreate>,
) -> AppResult<Json<Vec<Card>>> {
    tracing::info!(
        admin = %current_user.id,
        count = payload.count,
        card_type = ?payload.card_type,
        "Card batch requested"
    );
    let cards = state.registry.create_cards(payload).await?;
    Ok(Json(cards))
}

/// GET /api/cards - list cards with optional filters (admin)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Card>>> {
    let cards = state.registry.list(query.status, query.card_type).await?;
    Ok(Json(cards))
}

/// GET /api/cards/:id - card with its stamp codes (admin)
pub async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CardDetail>> {
    let detail = state.registry.detail(id).await?;
    Ok(Json(detail))
}

/// DELETE /api/cards/:id - hard removal (admin)
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.registry.delete(id).await?;
    Ok(Json(true))
}

/// POST /api/cards/:id/deactivate - force-expire (admin)
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.registry.deactivate(id).await?;
    Ok(Json(true))
}

/// POST /api/cards/claim - claim a card by code
pub async fn claim(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ClaimCardRequest>,
) -> AppResult<Json<Card>> {
    let card = state
        .registry
        .claim_card(&payload.code, &current_user.id)
        .await?;
    Ok(Json(card))
}

/// GET /api/cards/mine - caller's cards, with progress for reward cards
pub async fn mine(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OwnedCard>>> {
    let cards = state.registry.cards_for_owner(&current_user.id).await?;

    let mut owned = Vec::with_capacity(cards.len());
    for card in cards {
        let progress = match &card.variant {
            CardVariant::Reward { .. } => Some(state.redemptions.progress(&card).await?),
            _ => None,
        };
        owned.push(OwnedCard { card, progress });
    }
    Ok(Json(owned))
}

/// GET /api/cards/:id/progress - stage progress (owner or admin)
pub async fn progress(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<CardProgress>> {
    let card = state.registry.find_by_id(id).await?;

    let is_owner = card.owner_id.as_deref() == Some(current_user.id.as_str());
    if !is_owner && !current_user.is_admin() {
        return Err(AppError::new(ErrorCode::CardNotOwned));
    }

    let progress = state.redemptions.progress(&card).await?;
    Ok(Json(progress))
}

/// POST /api/cards/:id/redeem - redeem one stage
pub async fn redeem(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RedeemStageRequest>,
) -> AppResult<Json<RedemptionResult>> {
    let result = state
        .redemptions
        .redeem(id, payload.stage_index, &current_user.id)
        .await?;
    Ok(Json(result))
}
