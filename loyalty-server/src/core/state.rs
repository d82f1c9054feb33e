//! Server state — shared handles for all services
//!
//! [`ServerState`] holds the connection pool and one instance of each
//! loyalty service. Everything inside is cheaply cloneable (pools are
//! reference-counted), so axum clones the state per request without cost.

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::loyalty::{CardApplication, CardRegistry, RedemptionEngine, StampLedger, WalletService};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Card creation, lookup, claim, deactivation
    pub registry: CardRegistry,
    /// Stamp sets and activation
    pub ledger: StampLedger,
    /// Stage completion and redemption
    pub redemptions: RedemptionEngine,
    /// Checkout-time card application
    pub checkout: CardApplication,
    /// Coin balances
    pub wallet: WalletService,
}

impl ServerState {
    /// Open the database and construct all services.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.database_path).await?;
        Ok(Self::with_pool(config.clone(), db.pool))
    }

    /// Build the state over an existing pool (tests use in-memory pools).
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        Self {
            config,
            registry: CardRegistry::new(pool.clone()),
            ledger: StampLedger::new(pool.clone()),
            redemptions: RedemptionEngine::new(pool.clone()),
            checkout: CardApplication::new(pool.clone()),
            wallet: WalletService::new(pool.clone()),
            pool,
        }
    }
}
