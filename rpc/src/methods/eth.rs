use serde_json::Value;
use tracing::debug;

use super::{param_bool, param_bytes, param_height, param_object, param_str};
use crate::api::EthApi;
use crate::chain::CallRequest;
use crate::codec::{
    decode_address, decode_hash, decode_quantity, decode_storage_key, encode_bytes,
    encode_quantity, encode_u256,
};
use crate::error::RpcError;
use crate::translator::SendTxArgs;

type HandlerResult = Result<Value, RpcError>;

fn quantity_or_null(value: Option<u64>) -> Value {
    value.map_or(Value::Null, |v| Value::String(encode_quantity(v)))
}

/// Handler for eth_accounts
pub async fn accounts(api: &EthApi) -> HandlerResult {
    Ok(serde_json::to_value(api.accounts())?)
}

/// Handler for eth_coinbase
pub async fn coinbase(api: &EthApi) -> HandlerResult {
    Ok(serde_json::to_value(api.coinbase())?)
}

/// Handler for eth_chainId
pub async fn chain_id(api: &EthApi) -> HandlerResult {
    let id = encode_quantity(api.chain_id());
    debug!("eth_chainId -> {}", id);
    Ok(Value::String(id))
}

/// Handler for eth_blockNumber
pub async fn block_number(api: &EthApi) -> HandlerResult {
    let height = api.block_number()?;
    debug!("eth_blockNumber -> {}", height);
    Ok(Value::String(encode_quantity(height)))
}

/// Handler for eth_gasPrice
pub async fn gas_price(api: &EthApi) -> HandlerResult {
    Ok(Value::String(encode_u256(api.gas_price())))
}

/// Handler for eth_syncing. Always `false`: the façade serves committed state.
pub async fn syncing() -> HandlerResult {
    Ok(Value::Bool(false))
}

/// Handler for eth_getBalance
pub async fn get_balance(api: &EthApi, params: &[Value]) -> HandlerResult {
    let address = decode_address(param_str(params, 0)?)?;
    let height = param_height(params, 1)?;
    debug!("eth_getBalance: address={}, height={}", address, height);
    Ok(Value::String(encode_u256(api.get_balance(address, height)?)))
}

/// Handler for eth_getTransactionCount
pub async fn get_transaction_count(api: &EthApi, params: &[Value]) -> HandlerResult {
    let address = decode_address(param_str(params, 0)?)?;
    let height = param_height(params, 1)?;
    debug!("eth_getTransactionCount: address={}, height={}", address, height);
    let nonce = api.get_transaction_count(address, height)?;
    Ok(Value::String(encode_quantity(nonce)))
}

/// Handler for eth_getCode
pub async fn get_code(api: &EthApi, params: &[Value]) -> HandlerResult {
    let address = decode_address(param_str(params, 0)?)?;
    let height = param_height(params, 1)?;
    debug!("eth_getCode: address={}, height={}", address, height);
    Ok(Value::String(encode_bytes(&api.get_code(address, height)?)))
}

/// Handler for eth_getStorageAt
///
/// The key may omit its `0x` prefix and leading zeros. The stored bytes are
/// returned as written, without padding.
pub async fn get_storage_at(api: &EthApi, params: &[Value]) -> HandlerResult {
    let address = decode_address(param_str(params, 0)?)?;
    let key = decode_storage_key(param_str(params, 1)?)?;
    let height = param_height(params, 2)?;
    debug!("eth_getStorageAt: address={}, key={}, height={}", address, key, height);
    let value = api.get_storage_at(address, key, height)?;
    Ok(Value::String(encode_bytes(&value)))
}

/// Handler for eth_getBlockByHash
pub async fn get_block_by_hash(api: &EthApi, params: &[Value]) -> HandlerResult {
    let hash = decode_hash(param_str(params, 0)?)?;
    let full_tx = param_bool(params, 1)?;
    debug!("eth_getBlockByHash: hash={}, full_tx={}", hash, full_tx);
    Ok(serde_json::to_value(api.get_block_by_hash(hash, full_tx)?)?)
}

/// Handler for eth_getBlockByNumber
pub async fn get_block_by_number(api: &EthApi, params: &[Value]) -> HandlerResult {
    let height = param_height(params, 0)?;
    let full_tx = param_bool(params, 1)?;
    debug!("eth_getBlockByNumber: height={}, full_tx={}", height, full_tx);
    Ok(serde_json::to_value(api.get_block_by_number(height, full_tx)?)?)
}

/// Handler for eth_getBlockTransactionCountByHash
pub async fn get_block_transaction_count_by_hash(api: &EthApi, params: &[Value]) -> HandlerResult {
    let hash = decode_hash(param_str(params, 0)?)?;
    debug!("eth_getBlockTransactionCountByHash: hash={}", hash);
    Ok(quantity_or_null(api.get_block_transaction_count_by_hash(hash)?))
}

/// Handler for eth_getBlockTransactionCountByNumber
pub async fn get_block_transaction_count_by_number(
    api: &EthApi,
    params: &[Value],
) -> HandlerResult {
    let height = param_height(params, 0)?;
    debug!("eth_getBlockTransactionCountByNumber: height={}", height);
    Ok(quantity_or_null(api.get_block_transaction_count_by_number(height)?))
}

/// Handler for eth_getTransactionByBlockHashAndIndex
pub async fn get_transaction_by_block_hash_and_index(
    api: &EthApi,
    params: &[Value],
) -> HandlerResult {
    let hash = decode_hash(param_str(params, 0)?)?;
    let index = decode_quantity(param_str(params, 1)?)?;
    debug!("eth_getTransactionByBlockHashAndIndex: hash={}, index={}", hash, index);
    Ok(serde_json::to_value(
        api.get_transaction_by_block_hash_and_index(hash, index)?,
    )?)
}

/// Handler for eth_getTransactionByBlockNumberAndIndex
pub async fn get_transaction_by_block_number_and_index(
    api: &EthApi,
    params: &[Value],
) -> HandlerResult {
    let height = param_height(params, 0)?;
    let index = decode_quantity(param_str(params, 1)?)?;
    debug!(
        "eth_getTransactionByBlockNumberAndIndex: height={}, index={}",
        height, index
    );
    Ok(serde_json::to_value(
        api.get_transaction_by_block_number_and_index(height, index)?,
    )?)
}

/// Handler for eth_getTransactionByHash
pub async fn get_transaction_by_hash(api: &EthApi, params: &[Value]) -> HandlerResult {
    let hash = decode_hash(param_str(params, 0)?)?;
    debug!("eth_getTransactionByHash: {}", hash);
    Ok(serde_json::to_value(api.get_transaction_by_hash(hash)?)?)
}

/// Handler for eth_getTransactionReceipt
pub async fn get_transaction_receipt(api: &EthApi, params: &[Value]) -> HandlerResult {
    let hash = decode_hash(param_str(params, 0)?)?;
    debug!("eth_getTransactionReceipt: {}", hash);
    Ok(serde_json::to_value(api.get_transaction_receipt(hash)?)?)
}

/// Handler for eth_call
pub async fn call(api: &EthApi, params: &[Value]) -> HandlerResult {
    let request: CallRequest = param_object(params, 0)?;
    let height = param_height(params, 1)?;
    debug!(
        "eth_call: to={:?}, data_len={}, height={}",
        request.to,
        request.payload().len(),
        height
    );
    Ok(Value::String(encode_bytes(&api.call(&request, height)?)))
}

/// Handler for eth_estimateGas
pub async fn estimate_gas(api: &EthApi, params: &[Value]) -> HandlerResult {
    let request: CallRequest = param_object(params, 0)?;
    debug!("eth_estimateGas: to={:?}", request.to);
    Ok(Value::String(encode_quantity(api.estimate_gas(&request)?)))
}

/// Handler for eth_sendRawTransaction
pub async fn send_raw_transaction(api: &EthApi, params: &[Value]) -> HandlerResult {
    let raw = param_bytes(params, 0)?;
    debug!("eth_sendRawTransaction: {} bytes", raw.len());
    let hash = api.send_raw_transaction(&raw)?;
    Ok(Value::String(encode_bytes(hash.as_slice())))
}

/// Handler for eth_sendTransaction
pub async fn send_transaction(api: &EthApi, params: &[Value]) -> HandlerResult {
    let args: SendTxArgs = param_object(params, 0)?;
    debug!("eth_sendTransaction: from={}, to={:?}", args.from, args.to);
    let hash = api.send_transaction(&args)?;
    Ok(Value::String(encode_bytes(hash.as_slice())))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy_primitives::{Address, Bytes, B256};
    use serde_json::json;

    use super::*;
    use crate::chain::{BlockBuilder, DevKeystore, MemoryChain, MemoryEngine};

    fn api_with_chain() -> (EthApi, Arc<MemoryChain>) {
        let chain = Arc::new(MemoryChain::new());
        let engine = Arc::new(MemoryEngine::new(chain.clone()));
        let api = EthApi::with_memory_backend(
            0x2711,
            chain.clone(),
            engine,
            DevKeystore::new(vec![Address::repeat_byte(0xaa)]),
        );
        (api, chain)
    }

    #[tokio::test]
    async fn test_chain_id_and_gas_price() {
        let (api, _) = api_with_chain();
        assert_eq!(chain_id(&api).await.unwrap(), json!("0x2711"));
        assert_eq!(gas_price(&api).await.unwrap(), json!("0x4a817c800"));
        assert_eq!(syncing().await.unwrap(), json!(false));
    }

    #[tokio::test]
    async fn test_accounts_are_hex() {
        let (api, _) = api_with_chain();
        assert_eq!(
            accounts(&api).await.unwrap(),
            json!(["0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"])
        );
    }

    #[tokio::test]
    async fn test_coinbase_is_first_account() {
        let (api, _) = api_with_chain();
        assert_eq!(
            coinbase(&api).await.unwrap(),
            json!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
        );
    }

    #[tokio::test]
    async fn test_unknown_block_is_null() {
        let (api, _) = api_with_chain();
        let hash = format!("0x{}", "11".repeat(32));
        assert_eq!(
            get_block_by_hash(&api, &[json!(hash), json!(true)]).await.unwrap(),
            Value::Null
        );
        assert_eq!(
            get_block_transaction_count_by_number(&api, &[json!("0x64")])
                .await
                .unwrap(),
            Value::Null
        );
    }

    #[tokio::test]
    async fn test_block_count_and_index() {
        let (api, chain) = api_with_chain();
        chain
            .commit_block(
                BlockBuilder::new()
                    .hash(B256::repeat_byte(0x12))
                    .height(2)
                    .tx(B256::repeat_byte(0x56), vec![])
                    .tx(B256::repeat_byte(0x78), vec![])
                    .build(),
            )
            .unwrap();

        let count = get_block_transaction_count_by_number(&api, &[json!("latest")])
            .await
            .unwrap();
        assert_eq!(count, json!("0x2"));

        let tx = get_transaction_by_block_number_and_index(&api, &[json!("0x2"), json!("0x1")])
            .await
            .unwrap();
        assert_eq!(tx["hash"], json!(format!("0x{}", "78".repeat(32))));
        assert_eq!(tx["transactionIndex"], json!("0x1"));
    }

    #[tokio::test]
    async fn test_malformed_address_is_invalid_input() {
        let (api, _) = api_with_chain();
        let err = get_balance(&api, &[json!("0x1234"), json!("latest")])
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_storage_at_returns_raw_bytes() {
        let (api, chain) = api_with_chain();
        let contract = Address::repeat_byte(0xcc);
        chain
            .set_storage(contract, B256::with_last_byte(1), Bytes::from_static(&[0x2a]))
            .unwrap();
        let value = get_storage_at(
            &api,
            &[json!(contract.to_string()), json!("1"), json!("latest")],
        )
        .await
        .unwrap();
        assert_eq!(value, json!("0x2a"));

        let empty = get_storage_at(&api, &[json!(contract.to_string()), json!("0x2")])
            .await
            .unwrap();
        assert_eq!(empty, json!("0x"));
    }

    #[tokio::test]
    async fn test_send_transaction_builder_errors() {
        let (api, _) = api_with_chain();
        let err = send_transaction(
            &api,
            &[json!({
                "from": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "nonce": "0x0",
                "data": "0x01",
                "input": "0x02"
            })],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("both \"data\" and \"input\" are set"));

        let err = send_transaction(
            &api,
            &[json!({
                "from": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "nonce": "0x0"
            })],
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "contract creation without any data provided");
    }

    #[tokio::test]
    async fn test_send_raw_transaction_hash() {
        let (api, chain) = api_with_chain();
        // Unsigned legacy transfer: [nonce, gasPrice, gas, to, value, data].
        let raw = hex::decode(format!("dc800182520894{}8080", "aa".repeat(20))).unwrap();
        let hash = send_raw_transaction(&api, &[json!(encode_bytes(&raw))])
            .await
            .unwrap();
        let expected = crate::translator::raw::tx_hash(&raw);
        assert_eq!(hash, json!(encode_bytes(expected.as_slice())));
        assert_eq!(chain.pending().unwrap().len(), 1);
    }
}
