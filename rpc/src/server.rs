use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use http::HeaderValue;
use jsonrpsee::server::{RpcModule, Server, ServerHandle};
use jsonrpsee::types::{ErrorObjectOwned, Params};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use crate::api::EthApi;
use crate::config::Config;
use crate::error::RpcError;
use crate::methods::{eth, net, web3};

/// Shared state for the RPC server.
pub struct RpcState {
    pub config: Config,
    pub api: EthApi,
}

/// Build a CORS layer from the configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Bind the JSON-RPC server and start serving. Returns the bound address.
pub async fn spawn_server(config: Config, api: EthApi) -> Result<(SocketAddr, ServerHandle)> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.rpc_port));
    let cors = build_cors_layer(&config.cors_origins);
    let module = build_module(Arc::new(RpcState { config, api }))?;

    let server = Server::builder()
        .set_http_middleware(tower::ServiceBuilder::new().layer(cors))
        .build(addr)
        .await
        .map_err(|e| anyhow!("Failed to bind server to {}: {}", addr, e))?;
    let local_addr = server.local_addr()?;

    info!("RPC server listening on http://{}", local_addr);
    Ok((local_addr, server.start(module)))
}

/// Start the JSON-RPC server and run until it is stopped.
pub async fn start_server(config: Config, api: EthApi) -> Result<()> {
    info!("Chain ID: {} ({})", config.chain_id, config.chain_id_hex());
    let (_, handle) = spawn_server(config, api).await?;
    handle.stopped().await;
    info!("RPC server stopped");
    Ok(())
}

/// Build the RPC module with every method registered.
pub fn build_module(state: Arc<RpcState>) -> Result<RpcModule<Arc<RpcState>>> {
    let mut module = RpcModule::new(state);
    register_methods(&mut module)?;
    Ok(module)
}

/// Positional parameters of a request. Absent params read as an empty list;
/// named or scalar params are rejected.
fn positional(params: Params<'_>) -> Result<Vec<Value>, RpcError> {
    params
        .parse::<Option<Vec<Value>>>()
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            RpcError::invalid_input(format!("expected positional params: {}", e.message()))
        })
}

/// Register all JSON-RPC methods on the module.
fn register_methods(module: &mut RpcModule<Arc<RpcState>>) -> Result<()> {
    // --- eth_* methods ---

    module.register_async_method("eth_accounts", |_params, ctx, _| async move {
        eth::accounts(&ctx.api).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_coinbase", |_params, ctx, _| async move {
        eth::coinbase(&ctx.api).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_chainId", |_params, ctx, _| async move {
        eth::chain_id(&ctx.api).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_blockNumber", |_params, ctx, _| async move {
        eth::block_number(&ctx.api).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_gasPrice", |_params, ctx, _| async move {
        eth::gas_price(&ctx.api).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_syncing", |_params, _ctx, _| async move {
        eth::syncing().await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_getBalance", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_balance(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_getTransactionCount", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_transaction_count(&ctx.api, &p)
            .await
            .map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_getCode", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_code(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_getStorageAt", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_storage_at(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_getBlockByHash", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_block_by_hash(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_getBlockByNumber", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_block_by_number(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method(
        "eth_getBlockTransactionCountByHash",
        |params, ctx, _| async move {
            let p = positional(params)?;
            eth::get_block_transaction_count_by_hash(&ctx.api, &p)
                .await
                .map_err(ErrorObjectOwned::from)
        },
    )?;

    module.register_async_method(
        "eth_getBlockTransactionCountByNumber",
        |params, ctx, _| async move {
            let p = positional(params)?;
            eth::get_block_transaction_count_by_number(&ctx.api, &p)
                .await
                .map_err(ErrorObjectOwned::from)
        },
    )?;

    module.register_async_method(
        "eth_getTransactionByBlockHashAndIndex",
        |params, ctx, _| async move {
            let p = positional(params)?;
            eth::get_transaction_by_block_hash_and_index(&ctx.api, &p)
                .await
                .map_err(ErrorObjectOwned::from)
        },
    )?;

    module.register_async_method(
        "eth_getTransactionByBlockNumberAndIndex",
        |params, ctx, _| async move {
            let p = positional(params)?;
            eth::get_transaction_by_block_number_and_index(&ctx.api, &p)
                .await
                .map_err(ErrorObjectOwned::from)
        },
    )?;

    module.register_async_method("eth_getTransactionByHash", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_transaction_by_hash(&ctx.api, &p)
            .await
            .map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_getTransactionReceipt", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::get_transaction_receipt(&ctx.api, &p)
            .await
            .map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_call", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::call(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_estimateGas", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::estimate_gas(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_sendRawTransaction", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::send_raw_transaction(&ctx.api, &p)
            .await
            .map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("eth_sendTransaction", |params, ctx, _| async move {
        let p = positional(params)?;
        eth::send_transaction(&ctx.api, &p).await.map_err(ErrorObjectOwned::from)
    })?;

    // --- net_* methods ---

    module.register_async_method("net_version", |_params, ctx, _| async move {
        net::version(&ctx.api).await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("net_listening", |_params, _ctx, _| async move {
        net::listening().await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("net_peerCount", |_params, _ctx, _| async move {
        net::peer_count().await.map_err(ErrorObjectOwned::from)
    })?;

    // --- web3_* methods ---

    module.register_async_method("web3_clientVersion", |_params, _ctx, _| async move {
        web3::client_version().await.map_err(ErrorObjectOwned::from)
    })?;

    module.register_async_method("web3_sha3", |params, _ctx, _| async move {
        let p = positional(params)?;
        web3::sha3(&p).await.map_err(ErrorObjectOwned::from)
    })?;

    info!("Registered all RPC methods successfully");
    Ok(())
}
