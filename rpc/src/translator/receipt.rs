//! Receipt records to `eth_getTransactionReceipt` response objects.

use alloy_primitives::{Address, Bytes, B256, U64};
use serde::{Deserialize, Serialize};

use crate::chain::{Log, Receipt};

/// Log object nested in receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: U64,
    pub transaction_hash: B256,
    pub transaction_index: U64,
    pub block_hash: B256,
    pub log_index: U64,
    pub removed: bool,
}

/// Receipt object as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: B256,
    pub transaction_index: U64,
    pub block_hash: B256,
    pub block_number: U64,
    pub from: Address,
    pub to: Address,
    pub cumulative_gas_used: U64,
    /// `null` unless the transaction created a contract.
    pub contract_address: Option<Address>,
    pub gas_used: U64,
    pub logs: Vec<RpcLog>,
    pub logs_bloom: Bytes,
    pub status: U64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_str: Option<String>,
    /// Plain hex without a `0x` prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_data: Option<String>,
}

fn log_to_rpc(log: &Log, index: usize, receipt: &Receipt) -> RpcLog {
    RpcLog {
        address: log.address,
        topics: log.topics.clone(),
        data: log.data.clone(),
        block_number: U64::from(log.block_number),
        transaction_hash: receipt.transaction_hash,
        transaction_index: U64::from(receipt.transaction_index),
        block_hash: receipt.block_hash,
        log_index: U64::from(index as u64),
        removed: false,
    }
}

pub fn tx_to_receipt_rpc_resp(receipt: &Receipt) -> RpcReceipt {
    let failed = receipt.is_failed();
    RpcReceipt {
        transaction_hash: receipt.transaction_hash,
        transaction_index: U64::from(receipt.transaction_index),
        block_hash: receipt.block_hash,
        block_number: U64::from(receipt.block_number),
        from: receipt.from,
        to: receipt.to,
        cumulative_gas_used: U64::from(receipt.cumulative_gas_used),
        contract_address: (!receipt.contract_address.is_zero()).then_some(receipt.contract_address),
        gas_used: U64::from(receipt.gas_used),
        logs: receipt
            .logs
            .iter()
            .enumerate()
            .map(|(i, log)| log_to_rpc(log, i, receipt))
            .collect(),
        logs_bloom: Bytes::copy_from_slice(receipt.logs_bloom.as_slice()),
        status: U64::from(receipt.status),
        status_str: failed.then(|| receipt.status_str.clone()),
        out_data: failed.then(|| hex::encode(&receipt.out_data)),
    }
}

/// Translate each receipt, preserving order.
pub fn txs_to_receipt_rpc_resp(receipts: &[Receipt]) -> Vec<RpcReceipt> {
    receipts.iter().map(tx_to_receipt_rpc_resp).collect()
}
