//! Classification of failed executions into RPC-visible errors.

use alloy_primitives::Bytes;
use alloy_sol_types::{Revert, SolError};
use thiserror::Error;

use crate::codec::encode_bytes;

/// Error code shared by invalid-opcode and generic execution failures.
pub const DEFAULT_ERROR_CODE: i32 = -32000;

/// Error code Ethereum clients expect for `execution reverted`.
pub const REVERT_ERROR_CODE: i32 = 3;

/// Status code the engine reports for a successful execution.
pub const STATUS_SUCCESS: i32 = 0;

/// Name of an engine status code.
pub fn status_to_str(status: i32) -> &'static str {
    match status {
        0 => "success",
        1 => "failure",
        2 => "revert",
        3 => "out-of-gas",
        4 => "invalid-instruction",
        5 => "undefined-instruction",
        6 => "stack-overflow",
        7 => "stack-underflow",
        8 => "bad-jump-destination",
        9 => "invalid-memory-access",
        10 => "call-depth-exceeded",
        11 => "static-mode-violation",
        12 => "precompile-failure",
        13 => "contract-validation-failure",
        14 => "argument-out-of-range",
        15 => "wasm-unreachable-instruction",
        16 => "wasm-trap",
        17 => "insufficient-balance",
        -1 => "internal-error",
        -2 => "rejected",
        -3 => "out-of-memory",
        _ => "unknown",
    }
}

/// Three-way grouping of failing status codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecFailure {
    Revert,
    InvalidOpcode,
    Other(String),
}

impl ExecFailure {
    pub fn from_status(status: i32) -> Self {
        match status_to_str(status) {
            "revert" => Self::Revert,
            "invalid-instruction" => Self::InvalidOpcode,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Error returned by `eth_call` and `eth_estimateGas` for failed executions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("execution reverted{}", .reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    Reverted {
        /// Decoded `Error(string)` reason, when the data carries one.
        reason: Option<String>,
        data: Bytes,
    },

    #[error("invalid opcode")]
    InvalidOpcode,

    #[error("{0}")]
    Other(String),
}

impl CallError {
    /// JSON-RPC error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Reverted { .. } => REVERT_ERROR_CODE,
            Self::InvalidOpcode | Self::Other(_) => DEFAULT_ERROR_CODE,
        }
    }

    /// Machine-readable error data: the raw revert output as hex.
    pub fn data(&self) -> Option<String> {
        match self {
            Self::Reverted { data, .. } => Some(encode_bytes(data)),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Reverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

/// Decode a standard `Error(string)` revert payload.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data, true).ok().map(|revert| revert.reason)
}

/// Map a failing status code and its return data to a [`CallError`].
pub fn to_call_err(status: i32, ret_data: &[u8]) -> CallError {
    match ExecFailure::from_status(status) {
        ExecFailure::Revert => CallError::Reverted {
            reason: decode_revert_reason(ret_data),
            data: Bytes::copy_from_slice(ret_data),
        },
        ExecFailure::InvalidOpcode => CallError::InvalidOpcode,
        ExecFailure::Other(name) => CallError::Other(name),
    }
}
