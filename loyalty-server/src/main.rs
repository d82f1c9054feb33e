use loyalty_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env overrides before reading config
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("Loyalty ledger server starting...");

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);

    server.run().await?;
    Ok(())
}
