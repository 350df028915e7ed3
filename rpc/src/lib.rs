//! Ethereum JSON-RPC query façade
//!
//! This crate answers Ethereum-compatible JSON-RPC calls (eth_*, net_*,
//! web3_*) from a node's committed chain data. It reshapes internal block,
//! transaction and receipt records into the exact wire objects Ethereum
//! clients expect, and classifies failed executions into RPC error objects.
//!
//! # Architecture
//!
//! ```text
//! Client (MetaMask/Hardhat/ethers.js)
//!     |
//!     | eth_* JSON-RPC calls
//!     v
//! server -> methods -> api (EthApi)
//!     |                  |
//!     |                  +-- translator (records -> wire objects, errors)
//!     v
//! chain (ChainReader / ExecutionEngine / TxPool / Keystore)
//! ```
//!
//! # Modules
//!
//! - `codec` - Hex encoding of identifiers and quantities
//! - `chain` - Chain records, backend capability traits, in-memory backend
//! - `translator` - Record translators, transaction builder, error classifier
//! - `api` - Typed query API
//! - `methods` - JSON-RPC handlers (eth, net, web3)
//! - `server` - JSON-RPC server setup and method registration
//! - `config` - Environment and configuration management

pub mod api;
pub mod chain;
pub mod codec;
pub mod config;
pub mod error;
pub mod methods;
pub mod params;
pub mod server;
pub mod translator;
