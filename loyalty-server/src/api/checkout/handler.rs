//! Checkout API handlers

use axum::{
    Json,
    extract::{Extension, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{AppliedEffect, ApplyCardRequest};

/// POST /api/checkout/apply - fold a card into an order draft
pub async fn apply(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ApplyCardRequest>,
) -> AppResult<Json<AppliedEffect>> {
    let effect = state
        .checkout
        .apply_card(&payload.order, &payload.code, &current_user.id, payload.action)
        .await?;
    Ok(Json(effect))
}
