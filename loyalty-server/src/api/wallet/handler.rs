//! Wallet API handlers

use axum::{
    Json,
    extract::{Extension, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{WalletBalance, WalletPayRequest, WalletTransaction};

/// GET /api/wallet - caller's coin balance
pub async fn balance(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<WalletBalance>> {
    let balance = state.wallet.balance(&current_user.id).await?;
    Ok(Json(balance))
}

/// GET /api/wallet/transactions - caller's credit/debit history
pub async fn transactions(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<WalletTransaction>>> {
    let transactions = state.wallet.transactions(&current_user.id).await?;
    Ok(Json(transactions))
}

/// POST /api/wallet/pay - debit coins for an order
pub async fn pay(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<WalletPayRequest>,
) -> AppResult<Json<WalletBalance>> {
    let balance = state.wallet.pay(&current_user.id, payload).await?;
    Ok(Json(balance))
}
