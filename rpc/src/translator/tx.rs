//! Transaction records to `eth_getTransactionBy*` response objects.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

use crate::chain::Transaction;

/// Transaction object as returned by `eth_getTransactionBy*`.
///
/// `v`, `r` and `s` are always emitted as `null`: signatures are not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub block_hash: Option<B256>,
    pub block_number: Option<U256>,
    pub from: Address,
    pub gas: U64,
    pub gas_price: U256,
    pub hash: B256,
    pub input: Bytes,
    pub nonce: U64,
    /// Present even for contract creation, where it is the zero address.
    pub to: Option<Address>,
    pub transaction_index: Option<U64>,
    pub value: U256,
    pub v: Option<U256>,
    pub r: Option<U256>,
    pub s: Option<U256>,
}

pub fn tx_to_rpc_resp(tx: &Transaction) -> RpcTransaction {
    RpcTransaction {
        block_hash: Some(tx.block_hash),
        block_number: Some(U256::from(tx.block_number)),
        from: tx.from,
        gas: U64::from(tx.gas),
        gas_price: tx.gas_price,
        hash: tx.hash,
        input: tx.input.clone(),
        nonce: U64::from(tx.nonce),
        to: Some(tx.to),
        transaction_index: Some(U64::from(tx.transaction_index)),
        value: tx.value,
        v: None,
        r: None,
        s: None,
    }
}

/// Translate each transaction, preserving order.
pub fn txs_to_rpc_resp(txs: &[Transaction]) -> Vec<RpcTransaction> {
    txs.iter().map(tx_to_rpc_resp).collect()
}
