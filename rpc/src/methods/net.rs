use serde_json::Value;
use tracing::debug;

use crate::api::EthApi;
use crate::error::RpcError;

/// Handler for net_version
/// Returns the chain ID as a decimal string.
pub async fn version(api: &EthApi) -> Result<Value, RpcError> {
    let version = api.chain_id().to_string();
    debug!("net_version -> {}", version);
    Ok(Value::String(version))
}

/// Handler for net_listening
pub async fn listening() -> Result<Value, RpcError> {
    Ok(Value::Bool(true))
}

/// Handler for net_peerCount
/// The façade has no peer-to-peer layer of its own.
pub async fn peer_count() -> Result<Value, RpcError> {
    Ok(Value::String("0x0".to_string()))
}
