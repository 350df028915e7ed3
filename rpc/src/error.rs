//! JSON-RPC error types following Ethereum error code conventions.

use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

use crate::chain::BackendError;
use crate::codec::CodecError;
use crate::translator::{CallError, RawTxError, TxBuildError};

/// JSON-RPC error codes.
pub mod codes {
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Server error (reserved range: -32000 to -32099).
    pub const SERVER_ERROR: i32 = -32000;
    /// Transaction rejected.
    pub const TRANSACTION_REJECTED: i32 = -32003;
}

/// Errors surfaced by the query façade.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Malformed client-supplied value or argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Build(#[from] TxBuildError),

    #[error(transparent)]
    Execution(#[from] CallError),

    #[error("invalid raw transaction: {0}")]
    RawTx(#[from] RawTxError),

    /// `from` is not held by the keystore.
    #[error("unknown account")]
    UnknownAccount,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RpcError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::Build(_) | Self::RawTx(_) => codes::INVALID_PARAMS,
            Self::Execution(err) => err.code(),
            Self::UnknownAccount => codes::SERVER_ERROR,
            Self::Backend(BackendError::InvalidInput(_)) => codes::INVALID_PARAMS,
            Self::Backend(BackendError::Rejected(_)) => codes::TRANSACTION_REJECTED,
            Self::Backend(BackendError::Unavailable(_)) | Self::Serialization(_) => {
                codes::INTERNAL_ERROR
            }
        }
    }
}

impl From<CodecError> for RpcError {
    fn from(err: CodecError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<RpcError> for ErrorObjectOwned {
    fn from(err: RpcError) -> Self {
        let code = err.code();
        match &err {
            RpcError::Execution(call_err) => {
                ErrorObjectOwned::owned(code, err.to_string(), call_err.data())
            }
            _ => ErrorObjectOwned::owned(code, err.to_string(), None::<()>),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Bytes;

    use super::*;

    #[test]
    fn test_codec_errors_are_invalid_params() {
        let err: RpcError = CodecError::OddLength("0x1".into()).into();
        let obj: ErrorObjectOwned = err.into();
        assert_eq!(obj.code(), codes::INVALID_PARAMS);
        assert!(obj.message().starts_with("invalid input"));
    }

    #[test]
    fn test_builder_error_keeps_message() {
        let obj: ErrorObjectOwned = RpcError::from(TxBuildError::NoNonce).into();
        assert_eq!(obj.code(), codes::INVALID_PARAMS);
        assert_eq!(obj.message(), "no nonce");
    }

    #[test]
    fn test_revert_carries_code_and_data() {
        let err = RpcError::from(CallError::Reverted {
            reason: None,
            data: Bytes::from_static(&[0xde, 0xad]),
        });
        let obj: ErrorObjectOwned = err.into();
        assert_eq!(obj.code(), 3);
        assert_eq!(obj.message(), "execution reverted");
        assert_eq!(obj.data().map(|d| d.get()), Some("\"0xdead\""));
    }

    #[test]
    fn test_generic_execution_failure() {
        let obj: ErrorObjectOwned = RpcError::from(CallError::Other("out-of-gas".into())).into();
        assert_eq!(obj.code(), codes::SERVER_ERROR);
        assert_eq!(obj.message(), "out-of-gas");
        assert!(obj.data().is_none());
    }

    #[test]
    fn test_backend_failures() {
        let unavailable = RpcError::from(BackendError::Unavailable("db closed".into()));
        assert_eq!(unavailable.code(), codes::INTERNAL_ERROR);
        let rejected = RpcError::from(BackendError::Rejected("already known".into()));
        assert_eq!(rejected.code(), codes::TRANSACTION_REJECTED);
        assert_eq!(RpcError::UnknownAccount.code(), codes::SERVER_ERROR);
    }
}
