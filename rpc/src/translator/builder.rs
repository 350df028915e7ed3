//! Validation and construction of transactions from `eth_sendTransaction`
//! arguments.

use alloy_primitives::{Address, Bytes, U256, U64};
use rlp::RlpStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::{DEFAULT_GAS_PRICE, DEFAULT_RPC_GAS_LIMIT};

/// Client-supplied `eth_sendTransaction` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTxArgs {
    #[serde(default)]
    pub from: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U64>,
    /// Legacy name for `input`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Bytes>,
}

/// Rejections raised while building a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxBuildError {
    #[error("no nonce")]
    NoNonce,

    #[error("both \"data\" and \"input\" are set and not equal. Please use \"input\" to pass transaction call data")]
    AmbiguousPayload,

    #[error("contract creation without any data provided")]
    EmptyContractCreation,
}

/// Canonical unsigned legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub nonce: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub gas: u64,
    pub gas_price: U256,
    pub input: Bytes,
}

impl UnsignedTx {
    pub fn is_creation(&self) -> bool {
        self.to.is_none()
    }

    /// RLP list `[nonce, gasPrice, gas, to, value, input]`.
    pub fn rlp_encode(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(6);
        stream.append(&self.nonce);
        stream.append(&self.gas_price.to_be_bytes_trimmed_vec());
        stream.append(&self.gas);
        match self.to {
            Some(to) => stream.append(&to.to_vec()),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value.to_be_bytes_trimmed_vec());
        stream.append(&self.input.to_vec());
        stream.out().to_vec()
    }
}

/// Validate `args` and build the unsigned transaction they describe.
///
/// Nonces are never assigned here. A missing gas limit or gas price falls
/// back to the protocol defaults.
pub fn create_tx_from_send_args(args: &SendTxArgs) -> Result<UnsignedTx, TxBuildError> {
    let nonce = args.nonce.ok_or(TxBuildError::NoNonce)?;

    if let (Some(data), Some(input)) = (&args.data, &args.input) {
        if data != input {
            return Err(TxBuildError::AmbiguousPayload);
        }
    }

    let input = args
        .input
        .clone()
        .or_else(|| args.data.clone())
        .unwrap_or_default();

    if args.to.is_none() && input.is_empty() {
        return Err(TxBuildError::EmptyContractCreation);
    }

    let gas = args.gas.map(|g| g.to::<u64>()).unwrap_or(DEFAULT_RPC_GAS_LIMIT);
    let gas_price = args.gas_price.unwrap_or(U256::from(DEFAULT_GAS_PRICE));

    Ok(UnsignedTx {
        nonce: nonce.to::<u64>(),
        to: args.to,
        value: args.value.unwrap_or_default(),
        gas,
        gas_price,
        input,
    })
}
