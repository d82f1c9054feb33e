//! Server configuration
//!
//! # Environment variables
//!
//! All configuration can be overridden through the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/loyalty | working directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | DATABASE_PATH | {WORK_DIR}/loyalty.db | SQLite database file |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | LOG_LEVEL | info | default tracing level (RUST_LOG wins) |
//! | LOG_DIR | unset | daily-rolling log file directory |
//!
//! # Example
//!
//! ```ignore
//! WORK_DIR=/data/loyalty HTTP_PORT=8080 cargo run
//! ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Default log level (overridden by RUST_LOG)
    pub log_level: String,
    /// Optional log file directory
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/loyalty".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{}/loyalty.db", work_dir));
        Self {
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Override the paths and port, keeping the rest from the environment.
    /// Used by tests and local tooling.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = format!("{}/loyalty.db", config.work_dir);
        config.http_port = http_port;
        config
    }
}
