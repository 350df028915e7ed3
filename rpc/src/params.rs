//! Protocol-wide constants reported through the RPC surface.

/// Gas limit reported for every block. The chain enforces a single
/// protocol-wide block gas ceiling rather than a per-block value.
pub const BLOCK_MAX_GAS: u64 = 200_000_000;

/// Gas price applied to `eth_sendTransaction` when the caller omits one (wei).
pub const DEFAULT_GAS_PRICE: u64 = 20_000_000_000;

/// Gas limit applied to `eth_sendTransaction` when the caller omits one.
pub const DEFAULT_RPC_GAS_LIMIT: u64 = 10_000_000;

/// Height sentinel meaning "latest committed block".
pub const LATEST_HEIGHT: i64 = -1;

/// Gas charged for a plain value transfer.
pub const TX_BASE_GAS: u64 = 21_000;
