//! JSON-RPC handlers grouped by namespace.
//!
//! Each handler takes the positional parameters as raw JSON, decodes them
//! through the codec, calls into [`EthApi`](crate::api::EthApi) and returns
//! the wire-shaped result.

pub mod eth;
pub mod net;
pub mod web3;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::{decode_block_height, decode_bytes};
use crate::error::RpcError;
use crate::params::LATEST_HEIGHT;

fn required<'a>(params: &'a [Value], index: usize) -> Result<&'a Value, RpcError> {
    match params.get(index) {
        Some(Value::Null) | None => Err(RpcError::invalid_input(format!(
            "missing value for required argument {index}"
        ))),
        Some(value) => Ok(value),
    }
}

pub(crate) fn param_str(params: &[Value], index: usize) -> Result<&str, RpcError> {
    required(params, index)?
        .as_str()
        .ok_or_else(|| RpcError::invalid_input(format!("argument {index} must be a hex string")))
}

pub(crate) fn param_bytes(
    params: &[Value],
    index: usize,
) -> Result<alloy_primitives::Bytes, RpcError> {
    Ok(decode_bytes(param_str(params, index)?)?)
}

/// Optional block height; absent means latest.
pub(crate) fn param_height(params: &[Value], index: usize) -> Result<i64, RpcError> {
    match params.get(index) {
        Some(value) => Ok(decode_block_height(value)?),
        None => Ok(LATEST_HEIGHT),
    }
}

pub(crate) fn param_bool(params: &[Value], index: usize) -> Result<bool, RpcError> {
    match params.get(index) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(RpcError::invalid_input(format!(
            "argument {index} must be a boolean, got {other}"
        ))),
    }
}

pub(crate) fn param_object<T: DeserializeOwned>(
    params: &[Value],
    index: usize,
) -> Result<T, RpcError> {
    let value = required(params, index)?.clone();
    serde_json::from_value(value)
        .map_err(|e| RpcError::invalid_input(format!("argument {index}: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_required_param() {
        let err = param_str(&[], 0).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: missing value for required argument 0");
        assert!(param_str(&[Value::Null], 0).is_err());
    }

    #[test]
    fn test_height_defaults_to_latest() {
        assert_eq!(param_height(&[], 1).unwrap(), LATEST_HEIGHT);
        assert_eq!(param_height(&[json!("0x0"), json!("0x7b")], 1).unwrap(), 123);
        assert_eq!(param_height(&[json!("earliest")], 0).unwrap(), 0);
    }

    #[test]
    fn test_bool_param() {
        assert!(!param_bool(&[json!("0x1")], 1).unwrap());
        assert!(param_bool(&[json!("0x1"), json!(true)], 1).unwrap());
        assert!(param_bool(&[json!("0x1"), json!("yes")], 1).is_err());
    }
}
