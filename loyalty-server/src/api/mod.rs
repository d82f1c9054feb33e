//! API route modules
//!
//! # Structure
//!
//! - [`health`] — liveness check
//! - [`cards`] — card management, claim, progress, redemption
//! - [`stamps`] — stamp activation
//! - [`checkout`] — checkout-time card application
//! - [`wallet`] — coin balance and payments

pub mod cards;
pub mod checkout;
pub mod health;
pub mod stamps;
pub mod wallet;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::AppResult;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(cards::router())
        .merge(stamps::router())
        .merge(checkout::router())
        .merge(wallet::router())
        .with_state(state)
}
