//! Chain fixtures: JSON snapshots seeded into a [`MemoryChain`] at startup.

use std::collections::HashMap;
use std::path::Path;

use alloy_primitives::{Address, Bytes, B256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::memory::{MemoryChain, StoredBlock};
use super::types::Account;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEntry {
    pub address: Address,
    pub key: B256,
    pub value: Bytes,
}

/// Accounts, storage and blocks to preload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainFixture {
    #[serde(default)]
    pub accounts: HashMap<Address, Account>,
    #[serde(default)]
    pub storage: Vec<StorageEntry>,
    /// Published in order; the last one becomes the latest block.
    #[serde(default)]
    pub blocks: Vec<StoredBlock>,
}

impl ChainFixture {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading chain fixture {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing chain fixture {}", path.display()))
    }

    pub fn apply(self, chain: &MemoryChain) -> Result<()> {
        let (accounts, slots, blocks) = (self.accounts.len(), self.storage.len(), self.blocks.len());

        for (address, account) in self.accounts {
            chain.set_account(address, account)?;
        }
        for entry in self.storage {
            chain.set_storage(entry.address, entry.key, entry.value)?;
        }
        for block in self.blocks {
            chain.commit_block(block)?;
        }

        info!(
            "loaded chain fixture: {} accounts, {} storage slots, {} blocks",
            accounts, slots, blocks
        );
        Ok(())
    }
}
