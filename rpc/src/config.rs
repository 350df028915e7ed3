use std::env;
use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::{Context, Result};

use crate::codec::decode_address;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chain ID reported by eth_chainId and net_version
    pub chain_id: u64,
    /// RPC server port
    pub rpc_port: u16,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// JSON chain fixture preloaded into the in-memory chain
    pub chain_fixture: Option<PathBuf>,
    /// Accounts held by the dev keystore
    pub dev_accounts: Vec<Address>,
    /// Tracing filter directive, from RUST_LOG
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_id: 1,
            rpc_port: 8545,
            cors_origins: vec!["*".to_string()],
            chain_fixture: None,
            dev_accounts: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    /// Call dotenvy::dotenv() before calling this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let chain_id = match lookup("CHAIN_ID") {
            Some(v) => v.parse().context("CHAIN_ID must be a valid u64")?,
            None => defaults.chain_id,
        };

        let rpc_port = match lookup("RPC_PORT") {
            Some(v) => v.parse().context("RPC_PORT must be a valid u16")?,
            None => defaults.rpc_port,
        };

        let cors_origins = lookup("RPC_CORS_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.cors_origins);

        let chain_fixture = lookup("CHAIN_FIXTURE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let dev_accounts = lookup("DEV_ACCOUNTS")
            .map(|v| {
                split_list(&v)
                    .iter()
                    .map(|a| {
                        decode_address(a)
                            .with_context(|| format!("DEV_ACCOUNTS entry {a} is not an address"))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        Ok(Config {
            chain_id,
            rpc_port,
            cors_origins,
            chain_fixture,
            dev_accounts,
            log_level,
        })
    }

    /// Return the chain ID as a hex string with 0x prefix
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
