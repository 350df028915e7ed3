//! Value codec between fixed-width chain values and Ethereum wire encodings.
//!
//! Identifiers (addresses, hashes, byte strings) are emitted as lowercase
//! `0x`-prefixed hex at full width. Integers use the quantity encoding: `0x`
//! followed by hex digits without leading zeros (`0x0` for zero). Decoding is
//! strict about the `0x` prefix, matching what Ethereum clients send.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde_json::Value;
use thiserror::Error;

use crate::params::LATEST_HEIGHT;

/// Errors produced while decoding client-supplied hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("hex string without 0x prefix: {0}")]
    MissingPrefix(String),

    #[error("hex string of odd length: {0}")]
    OddLength(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("hex string \"0x\" is not a quantity")]
    EmptyQuantity,

    #[error("hex number with leading zero digits: {0}")]
    LeadingZero(String),

    #[error("hex number > {bits} bits: {value}")]
    Overflow { bits: u32, value: String },

    #[error("expected {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("invalid block number: {0}")]
    InvalidBlockNumber(String),
}

/// Encode a byte string as `0x`-prefixed lowercase hex.
pub fn encode_bytes(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Encode an unsigned integer with the quantity encoding.
pub fn encode_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Encode a 256-bit integer with the quantity encoding.
pub fn encode_u256(value: U256) -> String {
    format!("0x{:x}", value)
}

fn strip_prefix(input: &str) -> Result<&str, CodecError> {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or_else(|| CodecError::MissingPrefix(input.to_string()))
}

/// Decode a `0x`-prefixed byte string. `0x` decodes to the empty string.
pub fn decode_bytes(input: &str) -> Result<Bytes, CodecError> {
    let digits = strip_prefix(input)?;
    if digits.len() % 2 != 0 {
        return Err(CodecError::OddLength(input.to_string()));
    }
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|_| CodecError::InvalidHex(input.to_string()))
}

fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], CodecError> {
    let bytes = decode_bytes(input)?;
    if bytes.len() != N {
        return Err(CodecError::WrongLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Decode a 20-byte address.
pub fn decode_address(input: &str) -> Result<Address, CodecError> {
    decode_fixed::<20>(input).map(Address::from)
}

/// Decode a 32-byte hash.
pub fn decode_hash(input: &str) -> Result<B256, CodecError> {
    decode_fixed::<32>(input).map(B256::from)
}

fn quantity_digits(input: &str, max_digits: usize, bits: u32) -> Result<&str, CodecError> {
    let digits = strip_prefix(input)?;
    if digits.is_empty() {
        return Err(CodecError::EmptyQuantity);
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(CodecError::LeadingZero(input.to_string()));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidHex(input.to_string()));
    }
    if digits.len() > max_digits {
        return Err(CodecError::Overflow {
            bits,
            value: input.to_string(),
        });
    }
    Ok(digits)
}

/// Decode a quantity that must fit in 64 bits.
pub fn decode_quantity(input: &str) -> Result<u64, CodecError> {
    let digits = quantity_digits(input, 16, 64)?;
    u64::from_str_radix(digits, 16).map_err(|_| CodecError::InvalidHex(input.to_string()))
}

/// Decode a 256-bit quantity.
pub fn decode_u256(input: &str) -> Result<U256, CodecError> {
    let digits = quantity_digits(input, 64, 256)?;
    U256::from_str_radix(digits, 16).map_err(|_| CodecError::InvalidHex(input.to_string()))
}

/// Decode a storage slot key. The `0x` prefix is optional and short keys are
/// left-padded to 32 bytes.
pub fn decode_storage_key(input: &str) -> Result<B256, CodecError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if digits.len() > 64 {
        return Err(CodecError::WrongLength {
            expected: 32,
            got: digits.len().div_ceil(2),
        });
    }
    let padded = format!("{:0>64}", digits);
    let bytes = hex::decode(&padded).map_err(|_| CodecError::InvalidHex(input.to_string()))?;
    Ok(B256::from_slice(&bytes))
}

/// Decode a block height parameter.
///
/// Accepts the tags `latest`/`pending` (the latest sentinel), `earliest`
/// (genesis), a hex quantity, or a plain JSON integer. Negative integers are
/// passed through and later resolve to the latest height.
pub fn decode_block_height(value: &Value) -> Result<i64, CodecError> {
    match value {
        Value::String(s) => match s.as_str() {
            "latest" | "pending" | "safe" | "finalized" => Ok(LATEST_HEIGHT),
            "earliest" => Ok(0),
            other => {
                let height = decode_quantity(other)?;
                i64::try_from(height).map_err(|_| CodecError::InvalidBlockNumber(other.to_string()))
            }
        },
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| CodecError::InvalidBlockNumber(n.to_string())),
        Value::Null => Ok(LATEST_HEIGHT),
        other => Err(CodecError::InvalidBlockNumber(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_quantity_is_minimal() {
        assert_eq!(encode_quantity(0), "0x0");
        assert_eq!(encode_quantity(123), "0x7b");
        assert_eq!(encode_quantity(0x100), "0x100");
        assert_eq!(encode_u256(U256::from(10_000_000u64)), "0x989680");
        assert_eq!(encode_u256(U256::ZERO), "0x0");
    }

    #[test]
    fn test_encode_identifiers_keep_full_width() {
        assert_eq!(encode_bytes(&[0u8; 4]), "0x00000000");
        let addr = Address::repeat_byte(0xab);
        assert_eq!(encode_bytes(addr.as_slice()).len(), 42);
        assert_eq!(encode_bytes(&[]), "0x");
    }

    #[test]
    fn test_decode_bytes() {
        assert_eq!(decode_bytes("0x1234").unwrap().as_ref(), &[0x12, 0x34]);
        assert!(decode_bytes("0x").unwrap().is_empty());
        assert_eq!(
            decode_bytes("1234"),
            Err(CodecError::MissingPrefix("1234".into()))
        );
        assert_eq!(decode_bytes("0x123"), Err(CodecError::OddLength("0x123".into())));
        assert_eq!(decode_bytes("0xzz"), Err(CodecError::InvalidHex("0xzz".into())));
    }

    #[test]
    fn test_decode_fixed_width() {
        let hash = format!("0x1234{}", "00".repeat(30));
        let decoded = decode_hash(&hash).unwrap();
        assert_eq!(decoded[0], 0x12);
        assert_eq!(decoded[1], 0x34);

        assert_eq!(
            decode_address("0x1234"),
            Err(CodecError::WrongLength { expected: 20, got: 2 })
        );
        let addr = format!("0x{}", "a1".repeat(20));
        assert_eq!(decode_address(&addr).unwrap(), Address::repeat_byte(0xa1));
    }

    #[test]
    fn test_decode_quantity() {
        assert_eq!(decode_quantity("0x0").unwrap(), 0);
        assert_eq!(decode_quantity("0x7b").unwrap(), 123);
        assert_eq!(decode_quantity("0x"), Err(CodecError::EmptyQuantity));
        assert_eq!(decode_quantity("0x01"), Err(CodecError::LeadingZero("0x01".into())));
        assert!(matches!(
            decode_quantity("0x10000000000000000"),
            Err(CodecError::Overflow { bits: 64, .. })
        ));
        assert_eq!(decode_u256("0x989680").unwrap(), U256::from(10_000_000u64));
    }

    #[test]
    fn test_decode_storage_key() {
        let key = decode_storage_key(&"abcd".repeat(8)).unwrap();
        assert_eq!(key[0], 0xab);
        assert_eq!(key[31], 0xcd);

        let short = decode_storage_key("0x1").unwrap();
        assert_eq!(short, B256::with_last_byte(1));
        assert!(decode_storage_key("0xgg").is_err());
    }

    #[test]
    fn test_decode_block_height() {
        assert_eq!(decode_block_height(&json!("latest")).unwrap(), LATEST_HEIGHT);
        assert_eq!(decode_block_height(&json!("pending")).unwrap(), LATEST_HEIGHT);
        assert_eq!(decode_block_height(&json!("earliest")).unwrap(), 0);
        assert_eq!(decode_block_height(&json!("0x7b")).unwrap(), 123);
        assert_eq!(decode_block_height(&json!(99)).unwrap(), 99);
        assert_eq!(decode_block_height(&json!(-1)).unwrap(), LATEST_HEIGHT);
        assert!(decode_block_height(&json!("soon")).is_err());
        assert!(decode_block_height(&json!(true)).is_err());
    }
}
