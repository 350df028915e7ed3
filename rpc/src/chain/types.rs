//! Committed chain records as the storage layer hands them to the façade.
//!
//! These are read-only projections. Translators copy out of them and never
//! mutate them.

use alloy_primitives::{Address, Bloom, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::translator::call_error::STATUS_SUCCESS;

/// Receipt status for a transaction that executed successfully.
pub const RECEIPT_STATUS_SUCCESSFUL: u64 = 1;
/// Receipt status for a transaction that failed during execution.
pub const RECEIPT_STATUS_FAILED: u64 = 0;

/// A committed block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    pub state_root: B256,
    pub transactions_root: B256,
    pub miner: Address,
    pub size: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    /// Transaction hashes in inclusion order.
    pub transactions: Vec<B256>,
}

/// A committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub hash: B256,
    pub from: Address,
    /// Zero for contract creation.
    pub to: Address,
    pub nonce: u64,
    pub gas: u64,
    pub gas_price: U256,
    pub value: U256,
    pub input: Bytes,
    pub block_hash: B256,
    pub block_number: u64,
    pub transaction_index: u64,
}

/// A log entry emitted during execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Log {
    pub address: Address,
    /// At most four topics.
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
}

/// Execution receipt of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub transaction_index: u64,
    pub block_hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Address,
    pub cumulative_gas_used: u64,
    pub gas_used: u64,
    /// All-zero when the transaction did not create a contract.
    pub contract_address: Address,
    pub logs: Vec<Log>,
    pub logs_bloom: Bloom,
    pub status: u64,
    /// Engine status name; populated only on failure.
    pub status_str: String,
    /// Raw return data; populated only on failure.
    pub out_data: Bytes,
}

impl Default for Receipt {
    fn default() -> Self {
        Self {
            transaction_hash: B256::ZERO,
            transaction_index: 0,
            block_hash: B256::ZERO,
            block_number: 0,
            from: Address::ZERO,
            to: Address::ZERO,
            cumulative_gas_used: 0,
            gas_used: 0,
            contract_address: Address::ZERO,
            logs: Vec::new(),
            logs_bloom: Bloom::ZERO,
            status: RECEIPT_STATUS_SUCCESSFUL,
            status_str: String::new(),
            out_data: Bytes::new(),
        }
    }
}

impl Receipt {
    pub fn is_failed(&self) -> bool {
        self.status == RECEIPT_STATUS_FAILED
    }
}

/// Account state at some height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub balance: U256,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub code: Bytes,
}

/// Outcome reported by the execution engine for `call` and `estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// EVMC-style status code; zero is success.
    pub status: i32,
    pub return_data: Bytes,
    pub gas_used: u64,
}

impl ExecOutcome {
    pub fn success(return_data: Bytes, gas_used: u64) -> Self {
        Self {
            status: STATUS_SUCCESS,
            return_data,
            gas_used,
        }
    }

    pub fn failure(status: i32, return_data: Bytes, gas_used: u64) -> Self {
        Self {
            status,
            return_data,
            gas_used,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Message for `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<alloy_primitives::U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Bytes>,
}

impl CallRequest {
    /// Call data, preferring `input` over `data`.
    pub fn payload(&self) -> Bytes {
        self.input.clone().or_else(|| self.data.clone()).unwrap_or_default()
    }
}
