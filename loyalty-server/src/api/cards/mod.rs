//! Cards API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cards", routes())
}

fn routes() -> Router<ServerState> {
    // Customer routes: claim, own cards, progress, redemption
    let customer_routes = Router::new()
        .route("/claim", post(handler::claim))
        .route("/mine", get(handler::mine))
        .route("/{id}/progress", get(handler::progress))
        .route("/{id}/redeem", post(handler::redeem));

    // Management routes: issuance and lifecycle, admin only
    let admin_routes = Router::new()
        .route("/", post(handler::create_batch).get(handler::list))
        .route("/{id}", get(handler::detail).delete(handler::delete))
        .route("/{id}/deactivate", post(handler::deactivate))
        .layer(middleware::from_fn(require_admin));

    customer_routes.merge(admin_routes)
}
