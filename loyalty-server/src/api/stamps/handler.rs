//! Stamps API handlers

use axum::{
    Json,
    extract::{Extension, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{ActivateStampRequest, Stamp};

/// POST /api/stamps/activate - activate one stamp code
pub async fn activate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ActivateStampRequest>,
) -> AppResult<Json<Stamp>> {
    let stamp = state
        .ledger
        .activate(payload.card_id, &payload.code, &current_user.id)
        .await?;
    Ok(Json(stamp))
}
