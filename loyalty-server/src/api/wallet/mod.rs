//! Wallet API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/wallet", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::balance))
        .route("/transactions", get(handler::transactions))
        .route("/pay", post(handler::pay))
}
