//! Typed query API.
//!
//! [`EthApi`] reads from the backend collaborators, resolves heights, applies
//! the not-found policy and hands records to the translators. JSON shaping
//! happens one layer up in [`crate::methods`].

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::{debug, info};

use crate::chain::{
    Block, CallRequest, ChainReader, DevKeystore, ExecutionEngine, Keystore, MemoryChain,
    MemoryEngine, TxPool,
};
use crate::error::RpcError;
use crate::params::DEFAULT_GAS_PRICE;
use crate::translator::{
    block_to_rpc_resp, create_tx_from_send_args, decode_raw_transaction, to_call_err,
    tx_to_receipt_rpc_resp, tx_to_rpc_resp, RpcBlock, RpcReceipt, RpcTransaction, SendTxArgs,
};

pub type ApiResult<T> = Result<T, RpcError>;

/// The `eth` namespace over a set of backend collaborators.
#[derive(Clone)]
pub struct EthApi {
    chain_id: u64,
    reader: Arc<dyn ChainReader>,
    engine: Arc<dyn ExecutionEngine>,
    pool: Arc<dyn TxPool>,
    keystore: Arc<dyn Keystore>,
}

impl EthApi {
    pub fn new(
        chain_id: u64,
        reader: Arc<dyn ChainReader>,
        engine: Arc<dyn ExecutionEngine>,
        pool: Arc<dyn TxPool>,
        keystore: Arc<dyn Keystore>,
    ) -> Self {
        Self {
            chain_id,
            reader,
            engine,
            pool,
            keystore,
        }
    }

    /// Wire the API to an in-memory chain and engine.
    pub fn with_memory_backend(
        chain_id: u64,
        chain: Arc<MemoryChain>,
        engine: Arc<MemoryEngine>,
        keystore: DevKeystore,
    ) -> Self {
        Self::new(chain_id, chain.clone(), engine, chain, Arc::new(keystore))
    }

    /// Map the latest sentinel (any negative height) to the committed tip.
    fn resolve_height(&self, height: i64) -> ApiResult<u64> {
        match u64::try_from(height) {
            Ok(height) => Ok(height),
            Err(_) => Ok(self.reader.latest_height()?),
        }
    }

    fn translate_block(&self, block: Block, full_tx: bool) -> ApiResult<RpcBlock> {
        if full_tx {
            let txs = self.reader.transactions_of_block(&block)?;
            Ok(block_to_rpc_resp(&block, Some(&txs)))
        } else {
            Ok(block_to_rpc_resp(&block, None))
        }
    }

    fn block_at(&self, height: i64) -> ApiResult<Option<Block>> {
        let height = self.resolve_height(height)?;
        Ok(self.reader.block_by_number(height)?)
    }

    fn transaction_in_block(
        &self,
        block: Option<Block>,
        index: u64,
    ) -> ApiResult<Option<RpcTransaction>> {
        let Some(block) = block else {
            return Ok(None);
        };
        let Some(hash) = usize::try_from(index)
            .ok()
            .and_then(|i| block.transactions.get(i))
        else {
            return Ok(None);
        };
        Ok(self
            .reader
            .transaction_by_hash(*hash)?
            .map(|tx| tx_to_rpc_resp(&tx)))
    }

    pub fn accounts(&self) -> Vec<Address> {
        self.keystore.accounts()
    }

    /// First keystore account, or the zero address when none is held.
    pub fn coinbase(&self) -> Address {
        self.accounts().first().copied().unwrap_or_default()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas_price(&self) -> U256 {
        U256::from(DEFAULT_GAS_PRICE)
    }

    pub fn block_number(&self) -> ApiResult<u64> {
        Ok(self.reader.latest_height()?)
    }

    pub fn get_balance(&self, address: Address, height: i64) -> ApiResult<U256> {
        let height = self.resolve_height(height)?;
        Ok(self.reader.balance(address, height)?)
    }

    pub fn get_transaction_count(&self, address: Address, height: i64) -> ApiResult<u64> {
        let height = self.resolve_height(height)?;
        Ok(self.reader.nonce(address, height)?)
    }

    pub fn get_code(&self, address: Address, height: i64) -> ApiResult<Bytes> {
        let height = self.resolve_height(height)?;
        Ok(self.reader.code(address, height)?)
    }

    /// Raw stored bytes for `key`; empty when the slot was never written.
    pub fn get_storage_at(&self, address: Address, key: B256, height: i64) -> ApiResult<Bytes> {
        let height = self.resolve_height(height)?;
        Ok(self.reader.storage_at(address, key, height)?)
    }

    pub fn get_block_by_hash(&self, hash: B256, full_tx: bool) -> ApiResult<Option<RpcBlock>> {
        match self.reader.block_by_hash(hash)? {
            Some(block) => self.translate_block(block, full_tx).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_block_by_number(&self, height: i64, full_tx: bool) -> ApiResult<Option<RpcBlock>> {
        match self.block_at(height)? {
            Some(block) => self.translate_block(block, full_tx).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_block_transaction_count_by_hash(&self, hash: B256) -> ApiResult<Option<u64>> {
        Ok(self
            .reader
            .block_by_hash(hash)?
            .map(|b| b.transactions.len() as u64))
    }

    pub fn get_block_transaction_count_by_number(&self, height: i64) -> ApiResult<Option<u64>> {
        Ok(self.block_at(height)?.map(|b| b.transactions.len() as u64))
    }

    pub fn get_transaction_by_block_hash_and_index(
        &self,
        hash: B256,
        index: u64,
    ) -> ApiResult<Option<RpcTransaction>> {
        let block = self.reader.block_by_hash(hash)?;
        self.transaction_in_block(block, index)
    }

    pub fn get_transaction_by_block_number_and_index(
        &self,
        height: i64,
        index: u64,
    ) -> ApiResult<Option<RpcTransaction>> {
        let block = self.block_at(height)?;
        self.transaction_in_block(block, index)
    }

    pub fn get_transaction_by_hash(&self, hash: B256) -> ApiResult<Option<RpcTransaction>> {
        Ok(self
            .reader
            .transaction_by_hash(hash)?
            .map(|tx| tx_to_rpc_resp(&tx)))
    }

    pub fn get_transaction_receipt(&self, hash: B256) -> ApiResult<Option<RpcReceipt>> {
        Ok(self
            .reader
            .receipt_by_hash(hash)?
            .map(|r| tx_to_receipt_rpc_resp(&r)))
    }

    /// Execute `request` without committing it and return its output.
    pub fn call(&self, request: &CallRequest, height: i64) -> ApiResult<Bytes> {
        let height = self.resolve_height(height)?;
        let outcome = self.engine.call(request, height)?;
        if !outcome.is_success() {
            debug!("eth_call failed with status {}", outcome.status);
            return Err(to_call_err(outcome.status, &outcome.return_data).into());
        }
        Ok(outcome.return_data)
    }

    pub fn estimate_gas(&self, request: &CallRequest) -> ApiResult<u64> {
        let outcome = self.engine.estimate_gas(request)?;
        if !outcome.is_success() {
            debug!("eth_estimateGas failed with status {}", outcome.status);
            return Err(to_call_err(outcome.status, &outcome.return_data).into());
        }
        Ok(outcome.gas_used)
    }

    pub fn send_raw_transaction(&self, raw: &[u8]) -> ApiResult<B256> {
        let decoded = decode_raw_transaction(raw)?;
        debug!(
            "raw tx: type={} nonce={} to={:?} signed={}",
            decoded.tx_type, decoded.nonce, decoded.to, decoded.signed
        );
        let hash = self.pool.send_raw_tx(raw)?;
        info!("accepted raw transaction {}", hash);
        Ok(hash)
    }

    pub fn send_transaction(&self, args: &SendTxArgs) -> ApiResult<B256> {
        let tx = create_tx_from_send_args(args)?;
        let signed = self
            .keystore
            .sign(args.from, &tx, self.chain_id)?
            .ok_or(RpcError::UnknownAccount)?;
        let hash = self.pool.send_raw_tx(&signed)?;
        info!("accepted transaction {} from {}", hash, args.from);
        Ok(hash)
    }
}
