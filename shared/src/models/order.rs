//! Checkout Seam Models
//!
//! The order/checkout subsystem calls into the loyalty core with an order
//! draft and a card code; the core returns an [`AppliedEffect`] for checkout
//! to fold into the total. The core never computes or stores order totals
//! beyond the effect it returns.

use serde::{Deserialize, Serialize};

/// What the caller wants to do with the card at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardAction {
    /// Issue a stamp activation code alongside this order (no total effect)
    Collect,
    /// Redeem the card's currently eligible reward stage
    Redeem,
    /// Consume a gift card (single-use)
    UseGift,
    /// Consume a coins card into the wallet (single-use)
    UseCoins,
}

/// One order line, as supplied by checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Order draft supplied by the checkout subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub order_id: Option<String>,
    pub subtotal: f64,
    pub items: Vec<OrderLine>,
}

/// Effect of applying a card to an order, for checkout to fold in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliedEffect {
    /// Stamp code to deliver with the order (receipt, message)
    StampCode { card_id: i64, code: String },
    /// Free item flagged for fulfillment
    FreeItem { card_id: i64, description: String },
    /// Percentage discount applied to the subtotal
    Discount {
        card_id: i64,
        percent: i64,
        amount: f64,
        total: f64,
    },
    /// Coins credited to the user's wallet
    CoinsCredit {
        card_id: i64,
        amount: i64,
        balance: i64,
    },
}

/// Apply-card payload (checkout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyCardRequest {
    pub code: String,
    pub action: CardAction,
    pub order: OrderDraft,
}
