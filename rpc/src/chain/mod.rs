//! Capability interfaces the query façade consumes.
//!
//! The storage reader, execution engine, transaction pool and keystore are
//! external collaborators. The façade only depends on these traits, so every
//! handler can be exercised against [`MemoryChain`].

pub mod fixture;
pub mod memory;
pub mod types;

use alloy_primitives::{Address, Bytes, B256, U256};
use thiserror::Error;

use crate::translator::builder::UnsignedTx;

pub use fixture::ChainFixture;
pub use memory::{BlockBuilder, DevKeystore, MemoryChain, MemoryEngine, StoredBlock};
pub use types::{Account, Block, CallRequest, ExecOutcome, Log, Receipt, Transaction};

/// Failures reported by a backend collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend could not interpret the request key.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The backend refused a submitted transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The backend failed while serving the request.
    #[error("backend failure: {0}")]
    Unavailable(String),
}

/// Point-in-time reads of committed chain data.
///
/// Lookups return `Ok(None)` when the entity does not exist. Heights passed in
/// are concrete; the latest sentinel is resolved by the caller.
pub trait ChainReader: Send + Sync {
    /// Height of the most recently flushed block.
    fn latest_height(&self) -> Result<u64, BackendError>;

    fn block_by_hash(&self, hash: B256) -> Result<Option<Block>, BackendError>;

    fn block_by_number(&self, height: u64) -> Result<Option<Block>, BackendError>;

    /// Transactions of a block in inclusion order.
    fn transactions_of_block(&self, block: &Block) -> Result<Vec<Transaction>, BackendError>;

    fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>, BackendError>;

    fn receipt_by_hash(&self, hash: B256) -> Result<Option<Receipt>, BackendError>;

    fn balance(&self, address: Address, height: u64) -> Result<U256, BackendError>;

    fn nonce(&self, address: Address, height: u64) -> Result<u64, BackendError>;

    fn code(&self, address: Address, height: u64) -> Result<Bytes, BackendError>;

    fn storage_at(&self, address: Address, key: B256, height: u64) -> Result<Bytes, BackendError>;
}

/// Synchronous EVM execution against a committed state.
pub trait ExecutionEngine: Send + Sync {
    /// Execute a message without committing it.
    fn call(&self, request: &CallRequest, height: u64) -> Result<ExecOutcome, BackendError>;

    /// Execute a message against the latest state and report the gas it used.
    fn estimate_gas(&self, request: &CallRequest) -> Result<ExecOutcome, BackendError>;
}

/// Accepts encoded transactions for inclusion.
pub trait TxPool: Send + Sync {
    /// Queue an encoded transaction and return its hash.
    fn send_raw_tx(&self, raw: &[u8]) -> Result<B256, BackendError>;
}

/// Holds the keys behind `eth_accounts` and signs on their behalf.
pub trait Keystore: Send + Sync {
    fn accounts(&self) -> Vec<Address>;

    /// Encode and sign `tx` for `from`. Returns `Ok(None)` when no key for
    /// `from` is held.
    fn sign(&self, from: Address, tx: &UnsignedTx, chain_id: u64)
        -> Result<Option<Bytes>, BackendError>;
}
