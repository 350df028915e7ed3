//! In-memory backend used by the dev server and the test suite.
//!
//! Blocks are staged and only become visible once flushed, mirroring the
//! storage layer's append/flush contract. Account state is kept for the
//! latest height only; height arguments are accepted and ignored.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use alloy_primitives::{Address, Bytes, B256, U256};
use rlp::RlpStream;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use tracing::{debug, info, warn};

use super::types::{Account, Block, CallRequest, ExecOutcome, Log, Receipt, Transaction};
use super::{BackendError, ChainReader, ExecutionEngine, Keystore, TxPool};
use crate::params::TX_BASE_GAS;
use crate::translator::builder::UnsignedTx;
use crate::translator::raw::tx_hash;

const STATUS_REVERT: i32 = 2;
const STATUS_INSUFFICIENT_BALANCE: i32 = 17;
const TX_CREATE_GAS: u64 = 32_000;
const TX_DATA_ZERO_GAS: u64 = 4;
const TX_DATA_NON_ZERO_GAS: u64 = 16;

/// A block together with the transactions and receipts it commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlock {
    pub block: Block,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub receipts: Vec<Receipt>,
}

#[derive(Debug, Default)]
struct ChainState {
    blocks: BTreeMap<u64, Block>,
    heights: HashMap<B256, u64>,
    txs: HashMap<B256, Transaction>,
    receipts: HashMap<B256, Receipt>,
    accounts: HashMap<Address, Account>,
    storage: HashMap<(Address, B256), Bytes>,
    staged: Option<StoredBlock>,
    latest: u64,
    pool: Vec<Bytes>,
    known: HashSet<B256>,
}

/// In-memory chain store implementing [`ChainReader`] and [`TxPool`].
#[derive(Debug, Default)]
pub struct MemoryChain {
    state: RwLock<ChainState>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ChainState>, BackendError> {
        self.state
            .read()
            .map_err(|e| BackendError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ChainState>, BackendError> {
        self.state
            .write()
            .map_err(|e| BackendError::Unavailable(format!("lock poisoned: {e}")))
    }

    /// Stage a block. It stays invisible until the next [`flush`](Self::flush)
    /// or the next staged block, whichever comes first.
    pub fn stage_block(&self, stored: StoredBlock) -> Result<(), BackendError> {
        let mut state = self.write()?;
        if let Some(previous) = state.staged.take() {
            publish(&mut state, previous);
        }
        state.staged = Some(stored);
        Ok(())
    }

    /// Publish the staged block, if any.
    pub fn flush(&self) -> Result<(), BackendError> {
        let mut state = self.write()?;
        if let Some(staged) = state.staged.take() {
            publish(&mut state, staged);
        }
        Ok(())
    }

    /// Stage and immediately publish a block.
    pub fn commit_block(&self, stored: StoredBlock) -> Result<(), BackendError> {
        self.stage_block(stored)?;
        self.flush()
    }

    pub fn set_account(&self, address: Address, account: Account) -> Result<(), BackendError> {
        self.write()?.accounts.insert(address, account);
        Ok(())
    }

    pub fn set_balance(&self, address: Address, balance: U256) -> Result<(), BackendError> {
        self.write()?.accounts.entry(address).or_default().balance = balance;
        Ok(())
    }

    pub fn set_code(&self, address: Address, code: Bytes) -> Result<(), BackendError> {
        self.write()?.accounts.entry(address).or_default().code = code;
        Ok(())
    }

    pub fn set_storage(&self, address: Address, key: B256, value: Bytes) -> Result<(), BackendError> {
        self.write()?.storage.insert((address, key), value);
        Ok(())
    }

    /// Install `runtime_code` at the address a creation by `deployer` with
    /// `nonce` lands on, bumping the deployer's nonce.
    pub fn deploy_contract(
        &self,
        deployer: Address,
        nonce: u64,
        runtime_code: Bytes,
    ) -> Result<Address, BackendError> {
        let address = contract_address(deployer, nonce);
        let mut state = self.write()?;
        state.accounts.entry(address).or_default().code = runtime_code;
        let sender = state.accounts.entry(deployer).or_default();
        sender.nonce = sender.nonce.max(nonce + 1);
        info!("deployed contract {} from {} (nonce {})", address, deployer, nonce);
        Ok(address)
    }

    /// Encoded transactions accepted by the pool, in submission order.
    pub fn pending(&self) -> Result<Vec<Bytes>, BackendError> {
        Ok(self.read()?.pool.clone())
    }
}

fn publish(state: &mut ChainState, stored: StoredBlock) {
    let StoredBlock {
        block,
        transactions,
        receipts,
    } = stored;

    debug!(
        "publishing block {} ({}) with {} txs",
        block.number,
        block.hash,
        block.transactions.len()
    );

    for tx in transactions {
        state.txs.insert(tx.hash, tx);
    }
    for receipt in receipts {
        state.receipts.insert(receipt.transaction_hash, receipt);
    }
    state.latest = state.latest.max(block.number);
    state.heights.insert(block.hash, block.number);
    state.blocks.insert(block.number, block);
}

/// Address of a contract created by `sender` at `nonce`.
pub fn contract_address(sender: Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender.to_vec());
    stream.append(&nonce);
    let hash = Keccak256::digest(stream.out());
    Address::from_slice(&hash[12..])
}

impl ChainReader for MemoryChain {
    fn latest_height(&self) -> Result<u64, BackendError> {
        Ok(self.read()?.latest)
    }

    fn block_by_hash(&self, hash: B256) -> Result<Option<Block>, BackendError> {
        let state = self.read()?;
        Ok(state
            .heights
            .get(&hash)
            .and_then(|height| state.blocks.get(height))
            .cloned())
    }

    fn block_by_number(&self, height: u64) -> Result<Option<Block>, BackendError> {
        Ok(self.read()?.blocks.get(&height).cloned())
    }

    fn transactions_of_block(&self, block: &Block) -> Result<Vec<Transaction>, BackendError> {
        let state = self.read()?;
        let mut txs = Vec::with_capacity(block.transactions.len());
        for hash in &block.transactions {
            match state.txs.get(hash) {
                Some(tx) => txs.push(tx.clone()),
                None => {
                    warn!("block {} lists unknown transaction {}", block.number, hash);
                    return Err(BackendError::Unavailable(format!(
                        "block {} lists unknown transaction {}",
                        block.number, hash
                    )));
                }
            }
        }
        Ok(txs)
    }

    fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, BackendError> {
        Ok(self.read()?.txs.get(&hash).cloned())
    }

    fn receipt_by_hash(&self, hash: B256) -> Result<Option<Receipt>, BackendError> {
        Ok(self.read()?.receipts.get(&hash).cloned())
    }

    fn balance(&self, address: Address, _height: u64) -> Result<U256, BackendError> {
        Ok(self
            .read()?
            .accounts
            .get(&address)
            .map(|a| a.balance)
            .unwrap_or_default())
    }

    fn nonce(&self, address: Address, _height: u64) -> Result<u64, BackendError> {
        Ok(self
            .read()?
            .accounts
            .get(&address)
            .map(|a| a.nonce)
            .unwrap_or_default())
    }

    fn code(&self, address: Address, _height: u64) -> Result<Bytes, BackendError> {
        Ok(self
            .read()?
            .accounts
            .get(&address)
            .map(|a| a.code.clone())
            .unwrap_or_default())
    }

    fn storage_at(&self, address: Address, key: B256, _height: u64) -> Result<Bytes, BackendError> {
        Ok(self
            .read()?
            .storage
            .get(&(address, key))
            .cloned()
            .unwrap_or_default())
    }
}

impl TxPool for MemoryChain {
    fn send_raw_tx(&self, raw: &[u8]) -> Result<B256, BackendError> {
        let hash = tx_hash(raw);
        let mut state = self.write()?;
        if !state.known.insert(hash) {
            return Err(BackendError::Rejected(format!("already known: {hash}")));
        }
        state.pool.push(Bytes::copy_from_slice(raw));
        info!("queued transaction {} ({} bytes)", hash, raw.len());
        Ok(hash)
    }
}

/// Keystore for development chains.
///
/// It holds no private keys: transactions from its accounts are handed to
/// the pool as unsigned legacy envelopes, which a dev chain accepts.
#[derive(Debug, Clone, Default)]
pub struct DevKeystore {
    accounts: Vec<Address>,
}

impl DevKeystore {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self { accounts }
    }
}

impl Keystore for DevKeystore {
    fn accounts(&self) -> Vec<Address> {
        self.accounts.clone()
    }

    fn sign(
        &self,
        from: Address,
        tx: &UnsignedTx,
        _chain_id: u64,
    ) -> Result<Option<Bytes>, BackendError> {
        if !self.accounts.contains(&from) {
            return Ok(None);
        }
        Ok(Some(tx.rlp_encode().into()))
    }
}

/// Minimal execution engine over a [`MemoryChain`].
///
/// Value transfers are checked against balances and charged intrinsic gas.
/// Contract code is not interpreted: calls into a contract answer only the
/// zero-argument getters registered with [`register_view`](Self::register_view),
/// each returning one storage word. Other selectors revert.
#[derive(Debug)]
pub struct MemoryEngine {
    chain: Arc<MemoryChain>,
    views: RwLock<HashMap<(Address, [u8; 4]), B256>>,
}

impl MemoryEngine {
    pub fn new(chain: Arc<MemoryChain>) -> Self {
        Self {
            chain,
            views: RwLock::new(HashMap::new()),
        }
    }

    /// Answer `selector` on `contract` with the word stored at `slot`.
    pub fn register_view(
        &self,
        contract: Address,
        selector: [u8; 4],
        slot: B256,
    ) -> Result<(), BackendError> {
        self.views
            .write()
            .map_err(|e| BackendError::Unavailable(format!("lock poisoned: {e}")))?
            .insert((contract, selector), slot);
        Ok(())
    }

    fn view_slot(&self, contract: Address, selector: [u8; 4]) -> Result<Option<B256>, BackendError> {
        Ok(self
            .views
            .read()
            .map_err(|e| BackendError::Unavailable(format!("lock poisoned: {e}")))?
            .get(&(contract, selector))
            .copied())
    }

    fn execute(&self, request: &CallRequest, height: u64) -> Result<ExecOutcome, BackendError> {
        let payload = request.payload();
        let gas = intrinsic_gas(&payload, request.to.is_none());
        let value = request.value.unwrap_or_default();

        if let Some(from) = request.from {
            if self.chain.balance(from, height)? < value {
                return Ok(ExecOutcome::failure(STATUS_INSUFFICIENT_BALANCE, Bytes::new(), gas));
            }
        }

        let Some(to) = request.to else {
            return Ok(ExecOutcome::success(Bytes::new(), gas));
        };

        if self.chain.code(to, height)?.is_empty() {
            return Ok(ExecOutcome::success(Bytes::new(), gas));
        }

        let slot = match payload.get(..4) {
            Some(selector) => {
                let mut sel = [0u8; 4];
                sel.copy_from_slice(selector);
                self.view_slot(to, sel)?
            }
            None => None,
        };

        match slot {
            Some(slot) => {
                let stored = self.chain.storage_at(to, slot, height)?;
                Ok(ExecOutcome::success(left_pad_word(&stored).into(), gas))
            }
            None => Ok(ExecOutcome::failure(STATUS_REVERT, Bytes::new(), gas)),
        }
    }
}

impl ExecutionEngine for MemoryEngine {
    fn call(&self, request: &CallRequest, height: u64) -> Result<ExecOutcome, BackendError> {
        self.execute(request, height)
    }

    fn estimate_gas(&self, request: &CallRequest) -> Result<ExecOutcome, BackendError> {
        let latest = self.chain.latest_height()?;
        self.execute(request, latest)
    }
}

fn intrinsic_gas(payload: &[u8], creation: bool) -> u64 {
    let data_gas: u64 = payload
        .iter()
        .map(|b| if *b == 0 { TX_DATA_ZERO_GAS } else { TX_DATA_NON_ZERO_GAS })
        .sum();
    let create_gas = if creation { TX_CREATE_GAS } else { 0 };
    TX_BASE_GAS + create_gas + data_gas
}

fn left_pad_word(value: &[u8]) -> Vec<u8> {
    let mut word = vec![0u8; 32];
    let tail = value.len().min(32);
    word[32 - tail..].copy_from_slice(&value[value.len() - tail..]);
    word
}

/// Fluent builder for blocks with transactions and receipts.
#[derive(Debug, Clone, Default)]
pub struct BlockBuilder {
    hash: B256,
    height: u64,
    timestamp: u64,
    txs: Vec<(B256, Vec<Log>)>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(mut self, hash: B256) -> Self {
        self.hash = hash;
        self
    }

    pub fn height(mut self, height: u64) -> Self {
        self.height = height;
        self
    }

    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Append a transaction emitting `logs`.
    pub fn tx(mut self, hash: B256, logs: Vec<Log>) -> Self {
        self.txs.push((hash, logs));
        self
    }

    pub fn build(self) -> StoredBlock {
        let mut block = Block {
            number: self.height,
            hash: self.hash,
            timestamp: self.timestamp,
            ..Default::default()
        };
        let mut transactions = Vec::with_capacity(self.txs.len());
        let mut receipts = Vec::with_capacity(self.txs.len());
        let mut cumulative_gas_used = 0;

        for (index, (hash, logs)) in self.txs.into_iter().enumerate() {
            cumulative_gas_used += TX_BASE_GAS;
            block.transactions.push(hash);
            transactions.push(Transaction {
                hash,
                gas: TX_BASE_GAS,
                block_hash: self.hash,
                block_number: self.height,
                transaction_index: index as u64,
                ..Default::default()
            });
            receipts.push(Receipt {
                transaction_hash: hash,
                transaction_index: index as u64,
                block_hash: self.hash,
                block_number: self.height,
                cumulative_gas_used,
                gas_used: TX_BASE_GAS,
                logs: logs
                    .into_iter()
                    .map(|log| Log {
                        block_number: self.height,
                        ..log
                    })
                    .collect(),
                ..Default::default()
            });
        }
        block.gas_used = cumulative_gas_used;

        StoredBlock {
            block,
            transactions,
            receipts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(b: u8) -> B256 {
        B256::with_last_byte(b)
    }

    #[test]
    fn test_staged_block_is_invisible_until_flushed() {
        let chain = MemoryChain::new();
        chain
            .stage_block(BlockBuilder::new().hash(hash(1)).height(5).build())
            .unwrap();
        assert_eq!(chain.block_by_number(5).unwrap(), None);
        assert_eq!(chain.block_by_hash(hash(1)).unwrap(), None);

        chain.flush().unwrap();
        assert_eq!(chain.block_by_number(5).unwrap().unwrap().hash, hash(1));
        assert_eq!(chain.latest_height().unwrap(), 5);
    }

    #[test]
    fn test_staging_next_block_publishes_previous() {
        let chain = MemoryChain::new();
        chain
            .stage_block(BlockBuilder::new().hash(hash(1)).height(1).build())
            .unwrap();
        chain
            .stage_block(BlockBuilder::new().hash(hash(2)).height(2).build())
            .unwrap();
        assert!(chain.block_by_number(1).unwrap().is_some());
        assert!(chain.block_by_number(2).unwrap().is_none());
        assert_eq!(chain.latest_height().unwrap(), 1);
    }

    #[test]
    fn test_transactions_of_block_follow_inclusion_order() {
        let chain = MemoryChain::new();
        let stored = BlockBuilder::new()
            .hash(hash(1))
            .height(3)
            .tx(hash(0x90), vec![])
            .tx(hash(0x56), vec![])
            .tx(hash(0x78), vec![])
            .build();
        let block = stored.block.clone();
        chain.commit_block(stored).unwrap();

        let txs = chain.transactions_of_block(&block).unwrap();
        let hashes: Vec<B256> = txs.iter().map(|t| t.hash).collect();
        assert_eq!(hashes, vec![hash(0x90), hash(0x56), hash(0x78)]);
        assert_eq!(txs[2].transaction_index, 2);
    }

    #[test]
    fn test_block_with_missing_transaction_is_an_error() {
        let chain = MemoryChain::new();
        let mut stored = BlockBuilder::new()
            .hash(hash(1))
            .height(3)
            .tx(hash(0x56), vec![])
            .tx(hash(0x78), vec![])
            .build();
        stored.transactions.truncate(1);
        let block = stored.block.clone();
        chain.commit_block(stored).unwrap();

        assert!(matches!(
            chain.transactions_of_block(&block),
            Err(BackendError::Unavailable(_))
        ));
    }

    #[test]
    fn test_builder_sets_header_fields() {
        let stored = BlockBuilder::new()
            .hash(hash(7))
            .height(12)
            .timestamp(1_700_000_000)
            .build();
        assert_eq!(stored.block.number, 12);
        assert_eq!(stored.block.hash, hash(7));
        assert_eq!(stored.block.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_builder_stamps_log_block_number() {
        let stored = BlockBuilder::new()
            .height(9)
            .tx(hash(1), vec![Log::default(), Log::default()])
            .build();
        assert!(stored.receipts[0].logs.iter().all(|l| l.block_number == 9));
        assert_eq!(stored.block.gas_used, TX_BASE_GAS);
    }

    #[test]
    fn test_pool_rejects_duplicates() {
        let chain = MemoryChain::new();
        let h = chain.send_raw_tx(&[0xc0]).unwrap();
        assert_eq!(h, tx_hash(&[0xc0]));
        assert!(matches!(chain.send_raw_tx(&[0xc0]), Err(BackendError::Rejected(_))));
        assert_eq!(chain.pending().unwrap().len(), 1);
    }

    #[test]
    fn test_contract_address_matches_known_vector() {
        // CREATE address of 0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0 at nonce 0.
        let sender: Address = "0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0".parse().unwrap();
        let expected: Address = "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d".parse().unwrap();
        assert_eq!(contract_address(sender, 0), expected);
    }

    #[test]
    fn test_engine_transfer_checks_balance() {
        let chain = Arc::new(MemoryChain::new());
        let from = Address::repeat_byte(1);
        chain.set_balance(from, U256::from(100)).unwrap();
        let engine = MemoryEngine::new(chain);

        let ok = engine
            .call(
                &CallRequest {
                    from: Some(from),
                    to: Some(Address::repeat_byte(2)),
                    value: Some(U256::from(10)),
                    ..Default::default()
                },
                0,
            )
            .unwrap();
        assert!(ok.is_success());
        assert!(ok.return_data.is_empty());
        assert_eq!(ok.gas_used, TX_BASE_GAS);

        let poor = engine
            .call(
                &CallRequest {
                    from: Some(from),
                    to: Some(Address::repeat_byte(2)),
                    value: Some(U256::from(1_000)),
                    ..Default::default()
                },
                0,
            )
            .unwrap();
        assert_eq!(poor.status, STATUS_INSUFFICIENT_BALANCE);
    }

    #[test]
    fn test_engine_answers_registered_views() {
        let chain = Arc::new(MemoryChain::new());
        let contract = Address::repeat_byte(0xcc);
        chain.set_code(contract, Bytes::from_static(&[0x60, 0x80])).unwrap();
        chain
            .set_storage(contract, B256::ZERO, Bytes::from_static(&[0x2a]))
            .unwrap();
        let engine = MemoryEngine::new(chain);
        engine.register_view(contract, [1, 2, 3, 4], B256::ZERO).unwrap();

        let out = engine
            .call(
                &CallRequest {
                    to: Some(contract),
                    input: Some(Bytes::from_static(&[1, 2, 3, 4])),
                    ..Default::default()
                },
                0,
            )
            .unwrap();
        assert!(out.is_success());
        assert_eq!(out.return_data.len(), 32);
        assert_eq!(out.return_data[31], 0x2a);

        let unknown = engine
            .call(
                &CallRequest {
                    to: Some(contract),
                    input: Some(Bytes::from_static(&[9, 9, 9, 9])),
                    ..Default::default()
                },
                0,
            )
            .unwrap();
        assert_eq!(unknown.status, STATUS_REVERT);
    }

    #[test]
    fn test_creation_gas_includes_data_cost() {
        assert_eq!(intrinsic_gas(&[], false), 21_000);
        assert_eq!(intrinsic_gas(&[0, 1], true), 21_000 + 32_000 + 4 + 16);
    }
}
