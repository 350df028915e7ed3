//! ethapi-rpc
//!
//! Entry point for the Ethereum JSON-RPC query server. Loads configuration
//! from environment/.env file, seeds the in-memory chain and starts the
//! JSON-RPC server on the configured port.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ethapi_rpc::api::EthApi;
use ethapi_rpc::chain::{ChainFixture, DevKeystore, MemoryChain, MemoryEngine};
use ethapi_rpc::config::Config;
use ethapi_rpc::server::start_server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    info!("=== ethapi-rpc {} ===", env!("CARGO_PKG_VERSION"));

    info!("Configuration:");
    info!("  Chain ID: {} ({})", config.chain_id, config.chain_id_hex());
    info!("  RPC Port: {}", config.rpc_port);
    info!("  CORS origins: {}", config.cors_origins.join(","));
    info!("  Dev accounts: {}", config.dev_accounts.len());

    let chain = Arc::new(MemoryChain::new());
    if let Some(path) = &config.chain_fixture {
        ChainFixture::from_file(path)?
            .apply(&chain)
            .with_context(|| format!("seeding chain from {}", path.display()))?;
    }
    let engine = Arc::new(MemoryEngine::new(chain.clone()));
    let keystore = DevKeystore::new(config.dev_accounts.clone());
    let api = EthApi::with_memory_backend(config.chain_id, chain, engine, keystore);

    start_server(config, api).await?;

    Ok(())
}
