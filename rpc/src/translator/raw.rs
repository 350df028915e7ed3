//! RLP validation of raw transactions submitted through
//! `eth_sendRawTransaction`.

use alloy_primitives::{Address, Bytes, B256, U256};
use rlp::Rlp;
use sha3::{Digest, Keccak256};
use thiserror::Error;
use tracing::debug;

const EIP2930_TX_TYPE: u8 = 0x01;
const EIP1559_TX_TYPE: u8 = 0x02;

/// Errors produced while decoding a raw transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawTxError {
    #[error("empty transaction payload")]
    Empty,

    #[error("unsupported transaction type: {0:#04x}")]
    UnsupportedType(u8),

    #[error("transaction RLP is not a list")]
    NotAList,

    #[error("unexpected RLP item count {count} for {kind} transaction")]
    ItemCount { kind: &'static str, count: usize },

    #[error("invalid field {field}: {reason}")]
    Field { field: &'static str, reason: String },
}

/// Fields recovered from an encoded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTx {
    pub tx_type: u8,
    pub nonce: u64,
    /// Legacy gas price, or max fee per gas for EIP-1559.
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: Option<u64>,
    pub signed: bool,
    /// Keccak-256 of the full encoded payload.
    pub hash: B256,
}

/// Keccak-256 of an encoded transaction.
pub fn tx_hash(raw: &[u8]) -> B256 {
    B256::from_slice(&Keccak256::digest(raw))
}

/// Decode a raw transaction.
///
/// Accepts legacy transactions (signed with 9 items, or unsigned with 6) and
/// EIP-2718 typed envelopes of type 1 and 2.
pub fn decode_raw_transaction(raw: &[u8]) -> Result<DecodedTx, RawTxError> {
    let first = *raw.first().ok_or(RawTxError::Empty)?;
    let hash = tx_hash(raw);

    if first >= 0xc0 {
        return decode_legacy(&Rlp::new(raw), hash);
    }

    debug!("typed transaction detected: type={}", first);
    let rlp = Rlp::new(&raw[1..]);
    match first {
        EIP2930_TX_TYPE => decode_eip2930(&rlp, hash),
        EIP1559_TX_TYPE => decode_eip1559(&rlp, hash),
        other => Err(RawTxError::UnsupportedType(other)),
    }
}

fn item_count(rlp: &Rlp, kind: &'static str) -> Result<usize, RawTxError> {
    if !rlp.is_list() {
        return Err(RawTxError::NotAList);
    }
    rlp.item_count().map_err(|e| RawTxError::Field {
        field: kind,
        reason: e.to_string(),
    })
}

fn u64_at(rlp: &Rlp, index: usize, field: &'static str) -> Result<u64, RawTxError> {
    rlp.val_at::<u64>(index).map_err(|e| RawTxError::Field {
        field,
        reason: e.to_string(),
    })
}

fn bytes_at(rlp: &Rlp, index: usize, field: &'static str) -> Result<Vec<u8>, RawTxError> {
    rlp.val_at::<Vec<u8>>(index).map_err(|e| RawTxError::Field {
        field,
        reason: e.to_string(),
    })
}

fn u256_at(rlp: &Rlp, index: usize, field: &'static str) -> Result<U256, RawTxError> {
    let bytes = bytes_at(rlp, index, field)?;
    U256::try_from_be_slice(&bytes).ok_or_else(|| RawTxError::Field {
        field,
        reason: format!("{} bytes exceed 256 bits", bytes.len()),
    })
}

fn to_at(rlp: &Rlp, index: usize) -> Result<Option<Address>, RawTxError> {
    let bytes = bytes_at(rlp, index, "to")?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(&bytes))),
        n => Err(RawTxError::Field {
            field: "to",
            reason: format!("expected 20 bytes, got {n}"),
        }),
    }
}

// [nonce, gasPrice, gasLimit, to, value, data] or with [v, r, s] appended.
fn decode_legacy(rlp: &Rlp, hash: B256) -> Result<DecodedTx, RawTxError> {
    let count = item_count(rlp, "legacy")?;
    if count != 6 && count != 9 {
        return Err(RawTxError::ItemCount { kind: "legacy", count });
    }

    let signed = count == 9;
    let chain_id = if signed {
        let v = u64_at(rlp, 6, "v")?;
        // EIP-155 replay protection
        (v >= 35).then(|| (v - 35) / 2)
    } else {
        None
    };

    Ok(DecodedTx {
        tx_type: 0,
        nonce: u64_at(rlp, 0, "nonce")?,
        gas_price: u256_at(rlp, 1, "gasPrice")?,
        gas_limit: u64_at(rlp, 2, "gas")?,
        to: to_at(rlp, 3)?,
        value: u256_at(rlp, 4, "value")?,
        data: bytes_at(rlp, 5, "data")?.into(),
        chain_id,
        signed,
        hash,
    })
}

// [chainId, nonce, gasPrice, gasLimit, to, value, data, accessList, y, r, s]
fn decode_eip2930(rlp: &Rlp, hash: B256) -> Result<DecodedTx, RawTxError> {
    let count = item_count(rlp, "eip-2930")?;
    if count != 11 {
        return Err(RawTxError::ItemCount { kind: "eip-2930", count });
    }
    Ok(DecodedTx {
        tx_type: EIP2930_TX_TYPE,
        chain_id: Some(u64_at(rlp, 0, "chainId")?),
        nonce: u64_at(rlp, 1, "nonce")?,
        gas_price: u256_at(rlp, 2, "gasPrice")?,
        gas_limit: u64_at(rlp, 3, "gas")?,
        to: to_at(rlp, 4)?,
        value: u256_at(rlp, 5, "value")?,
        data: bytes_at(rlp, 6, "data")?.into(),
        signed: true,
        hash,
    })
}

// [chainId, nonce, maxPriorityFee, maxFee, gasLimit, to, value, data, accessList, y, r, s]
fn decode_eip1559(rlp: &Rlp, hash: B256) -> Result<DecodedTx, RawTxError> {
    let count = item_count(rlp, "eip-1559")?;
    if count != 12 {
        return Err(RawTxError::ItemCount { kind: "eip-1559", count });
    }
    Ok(DecodedTx {
        tx_type: EIP1559_TX_TYPE,
        chain_id: Some(u64_at(rlp, 0, "chainId")?),
        nonce: u64_at(rlp, 1, "nonce")?,
        gas_price: u256_at(rlp, 3, "maxFeePerGas")?,
        gas_limit: u64_at(rlp, 4, "gas")?,
        to: to_at(rlp, 5)?,
        value: u256_at(rlp, 6, "value")?,
        data: bytes_at(rlp, 7, "data")?.into(),
        signed: true,
        hash,
    })
}
