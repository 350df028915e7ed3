//! Translation of chain records into Ethereum JSON-RPC wire objects, plus the
//! request-side builders and classifiers.

pub mod block;
pub mod builder;
pub mod call_error;
pub mod raw;
pub mod receipt;
pub mod tx;

pub use block::{block_to_rpc_resp, BlockTransactions, RpcBlock};
pub use builder::{create_tx_from_send_args, SendTxArgs, TxBuildError, UnsignedTx};
pub use call_error::{to_call_err, CallError, ExecFailure};
pub use raw::{decode_raw_transaction, DecodedTx, RawTxError};
pub use receipt::{tx_to_receipt_rpc_resp, txs_to_receipt_rpc_resp, RpcLog, RpcReceipt};
pub use tx::{tx_to_rpc_resp, txs_to_rpc_resp, RpcTransaction};
