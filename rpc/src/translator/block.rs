//! Block records to `eth_getBlockBy*` response objects.

use alloy_primitives::{Address, Bloom, Bytes, B256, B64, U64};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tx::{txs_to_rpc_resp, RpcTransaction};
use crate::chain::{Block, Transaction};
use crate::params::BLOCK_MAX_GAS;

/// Transactions of a block response: hashes, or full objects on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Hashes(Vec<B256>),
    Full(Vec<RpcTransaction>),
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            Self::Hashes(hashes) => hashes.len(),
            Self::Full(txs) => txs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Block object as returned by `eth_getBlockBy*`.
///
/// Proof-of-work fields have no counterpart on this chain and carry fixed
/// placeholders so that Ethereum clients can decode the object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub number: U64,
    pub hash: B256,
    pub parent_hash: B256,
    pub nonce: B64,
    pub sha3_uncles: B256,
    pub logs_bloom: Bloom,
    pub transactions_root: B256,
    pub state_root: B256,
    pub miner: Address,
    pub mix_hash: B256,
    pub difficulty: U64,
    pub total_difficulty: U64,
    pub extra_data: Bytes,
    pub size: U64,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    pub transactions: BlockTransactions,
    pub uncles: Vec<B256>,
    pub receipts_root: B256,
}

/// Translate a block.
///
/// With `full_txs` of `None` the response lists transaction hashes as stored.
/// With `Some(txs)` the list holds full transaction objects in the order
/// given, which callers take from the block's inclusion order.
pub fn block_to_rpc_resp(block: &Block, full_txs: Option<&[Transaction]>) -> RpcBlock {
    let transactions = match full_txs {
        Some(txs) => BlockTransactions::Full(txs_to_rpc_resp(txs)),
        None => BlockTransactions::Hashes(block.transactions.clone()),
    };

    debug!(
        "translated block: number={}, txs={}, full={}",
        block.number,
        transactions.len(),
        full_txs.is_some()
    );

    RpcBlock {
        number: U64::from(block.number),
        hash: block.hash,
        parent_hash: block.parent_hash,
        nonce: B64::ZERO,
        sha3_uncles: B256::ZERO,
        logs_bloom: Bloom::ZERO,
        transactions_root: block.transactions_root,
        state_root: block.state_root,
        miner: block.miner,
        mix_hash: B256::ZERO,
        difficulty: U64::ZERO,
        total_difficulty: U64::ZERO,
        extra_data: Bytes::new(),
        size: U64::from(block.size),
        gas_limit: U64::from(BLOCK_MAX_GAS),
        gas_used: U64::from(block.gas_used),
        timestamp: U64::from(block.timestamp),
        transactions,
        uncles: Vec::new(),
        receipts_root: B256::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_block() -> Block {
        let mut hash = [0u8; 32];
        hash[0] = 0x12;
        hash[1] = 0x34;
        Block {
            number: 123,
            hash: B256::from(hash),
            parent_hash: B256::repeat_byte(0x11),
            state_root: B256::repeat_byte(0x22),
            transactions_root: B256::repeat_byte(0x33),
            miner: Address::repeat_byte(0x44),
            size: 512,
            gas_used: 63_000,
            timestamp: 1_600_000_000,
            transactions: vec![
                B256::with_last_byte(0x56),
                B256::with_last_byte(0x78),
                B256::with_last_byte(0x90),
            ],
        }
    }

    #[test]
    fn test_identity_fields_follow_the_block() {
        let block = sample_block();
        let resp = block_to_rpc_resp(&block, None);
        assert_eq!(resp.number, U64::from(123));
        assert_eq!(resp.hash, block.hash);
        assert_eq!(resp.gas_used, U64::from(63_000));
        assert_eq!(resp.gas_limit, U64::from(BLOCK_MAX_GAS));
    }

    #[test]
    fn test_gas_limit_ignores_block_data() {
        let block = Block {
            gas_used: 7,
            ..Default::default()
        };
        let resp = block_to_rpc_resp(&block, None);
        assert_eq!(resp.gas_limit, U64::from(200_000_000u64));
    }

    #[test]
    fn test_placeholder_fields() {
        let json = serde_json::to_value(block_to_rpc_resp(&Block::default(), None)).unwrap();
        let zero_hash = format!("0x{}", "00".repeat(32));
        assert_eq!(json["nonce"], "0x0000000000000000");
        assert_eq!(json["sha3Uncles"], zero_hash);
        assert_eq!(json["mixHash"], zero_hash);
        assert_eq!(json["receiptsRoot"], zero_hash);
        assert_eq!(json["difficulty"], "0x0");
        assert_eq!(json["totalDifficulty"], "0x0");
        assert_eq!(json["extraData"], "0x");
        assert_eq!(json["uncles"], json!([]));
        assert_eq!(json["logsBloom"], format!("0x{}", "00".repeat(256)));
        assert_eq!(json["transactions"], json!([]));
    }

    #[test]
    fn test_summary_lists_hashes_in_order() {
        let block = sample_block();
        let resp = block_to_rpc_resp(&block, None);
        assert_eq!(resp.transactions, BlockTransactions::Hashes(block.transactions.clone()));
    }

    #[test]
    fn test_full_detail_lists_objects_in_order() {
        let block = sample_block();
        let txs: Vec<Transaction> = block
            .transactions
            .iter()
            .enumerate()
            .map(|(i, hash)| Transaction {
                hash: *hash,
                block_hash: block.hash,
                block_number: block.number,
                transaction_index: i as u64,
                ..Default::default()
            })
            .collect();

        let resp = block_to_rpc_resp(&block, Some(&txs));
        match resp.transactions {
            BlockTransactions::Full(full) => {
                let hashes: Vec<B256> = full.iter().map(|t| t.hash).collect();
                assert_eq!(hashes, block.transactions);
            }
            other => panic!("expected full transactions, got {other:?}"),
        }
    }
}
