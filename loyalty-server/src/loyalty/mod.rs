//! Loyalty Core
//!
//! The four concerns of the loyalty ledger, each a thin service over the
//! repository layer:
//!
//! - [`CardRegistry`] — card creation, lookup, claim, deactivation
//! - [`StampLedger`] — per-card stamp sets and activation
//! - [`RedemptionEngine`] — stage completion and redemption
//! - [`CardApplication`] — checkout-time card application
//!
//! plus [`WalletService`] for the coin balance credited by coins cards.

pub mod application;
pub mod codes;
pub mod ledger;
pub mod redemption;
pub mod registry;
pub mod wallet;

pub use application::CardApplication;
pub use ledger::StampLedger;
pub use redemption::{ProgressState, RedemptionEngine};
pub use registry::CardRegistry;
pub use wallet::WalletService;

#[cfg(test)]
mod tests;
