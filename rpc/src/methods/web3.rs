use serde_json::Value;
use sha3::{Digest, Keccak256};
use tracing::debug;

use super::param_bytes;
use crate::codec::encode_bytes;
use crate::error::RpcError;

/// Handler for web3_clientVersion
pub async fn client_version() -> Result<Value, RpcError> {
    let version = format!("ethapi-rpc/{}", env!("CARGO_PKG_VERSION"));
    debug!("web3_clientVersion -> {}", version);
    Ok(Value::String(version))
}

/// Handler for web3_sha3
/// Returns the Keccak-256 hash of the given data.
pub async fn sha3(params: &[Value]) -> Result<Value, RpcError> {
    let data = param_bytes(params, 0)?;
    let result = encode_bytes(&Keccak256::digest(&data));
    debug!("web3_sha3: input_len={} -> {}", data.len(), result);
    Ok(Value::String(result))
}
