//! Loyalty Ledger Server
//!
//! # Architecture overview
//!
//! A small HTTP service for restaurant loyalty instruments: reward cards
//! with stamp-based stages, single-use gift cards, and coins cards that
//! credit a wallet balance.
//!
//! # Module structure
//!
//! ```text
//! loyalty-server/src/
//! ├── core/          # configuration, state, server lifecycle
//! ├── auth/          # trusted identity headers, admin guard
//! ├── loyalty/       # registry, stamp ledger, redemption, application
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SQLite pool, migrations, repositories
//! └── utils/         # error types, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod loyalty;
pub mod utils;

// Re-export public types
pub use crate::core::{Config, Server, ServerState};
pub use crate::loyalty::{
    CardApplication, CardRegistry, RedemptionEngine, StampLedger, WalletService,
};
pub use crate::utils::logger::{init_logger, init_logger_with_file};
pub use crate::utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
