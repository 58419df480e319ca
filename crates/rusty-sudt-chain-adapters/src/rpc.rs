//! Blocking JSON-RPC client against a CKB node with the integrated indexer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ckb_jsonrpc_types::JsonBytes;
use ckb_types::core::TransactionView;
use ckb_types::H256;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use rusty_sudt_chain_core::{CellPage, CellQuery, ChainRpcPort, LiveCell, PortError, TxStatus};

const RPC_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpChainRpc {
    url: String,
    client: reqwest::blocking::Client,
    next_id: AtomicU64,
}

impl HttpChainRpc {
    pub fn new(url: impl Into<String>) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .map_err(|e| PortError::Transport(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, PortError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, id, "rpc call");

        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .map_err(|e| PortError::Transport(e.to_string()))?
            .json()
            .map_err(|e| PortError::Transport(format!("{method}: {e}")))?;

        if let Some(error) = response.error {
            return Err(PortError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| PortError::Transport(format!("{method}: empty rpc response")))
    }

    fn search_key(query: &CellQuery) -> Result<Value, PortError> {
        let lock = serde_json::to_value(ckb_jsonrpc_types::Script::from(query.lock.clone()))
            .map_err(encode_error)?;
        let mut search_key = json!({
            "script": lock,
            "script_type": "lock",
            "with_data": query.with_data,
        });

        let mut filter = serde_json::Map::new();
        if let Some(type_script) = &query.type_script {
            let script =
                serde_json::to_value(ckb_jsonrpc_types::Script::from(type_script.clone()))
                    .map_err(encode_error)?;
            filter.insert("script".into(), script);
        }
        if let Some((start, end)) = query.data_len_range {
            filter.insert("output_data_len_range".into(), hex_range(start, end));
        }
        if let Some((start, end)) = query.type_len_range {
            filter.insert("script_len_range".into(), hex_range(start, end));
        }
        if !filter.is_empty() {
            search_key["filter"] = Value::Object(filter);
        }
        Ok(search_key)
    }
}

impl ChainRpcPort for HttpChainRpc {
    fn send_transaction(&self, tx: &TransactionView) -> Result<H256, PortError> {
        let transaction = ckb_jsonrpc_types::Transaction::from(tx.data());
        self.call("send_transaction", json!([transaction, "passthrough"]))
    }

    fn get_transaction_status(&self, tx_hash: &H256) -> Result<Option<TxStatus>, PortError> {
        let response: Option<TransactionStatusView> =
            self.call("get_transaction", json!([tx_hash]))?;
        Ok(response.map(|r| r.tx_status.status))
    }

    fn find_cells(
        &self,
        query: &CellQuery,
        cursor: Option<&[u8]>,
        limit: u32,
    ) -> Result<CellPage, PortError> {
        let search_key = Self::search_key(query)?;
        let cursor = match cursor {
            Some(bytes) => serde_json::to_value(JsonBytes::from_vec(bytes.to_vec()))
                .map_err(encode_error)?,
            None => Value::Null,
        };
        let page: CellsView = self.call(
            "get_cells",
            json!([search_key, "asc", format!("{limit:#x}"), cursor]),
        )?;

        let last_cursor = if page.objects.is_empty() {
            None
        } else {
            Some(page.last_cursor.into_bytes().to_vec())
        };
        let cells = page
            .objects
            .into_iter()
            .map(|cell| LiveCell {
                out_point: cell.out_point.into(),
                output: cell.output.into(),
                data: cell
                    .output_data
                    .map(JsonBytes::into_bytes)
                    .unwrap_or_default(),
            })
            .collect();
        Ok(CellPage { cells, last_cursor })
    }
}

/// Thin view of `get_transaction`: only the status field matters here.
#[derive(Deserialize)]
struct TransactionStatusView {
    tx_status: StatusField,
}

#[derive(Deserialize)]
struct StatusField {
    status: TxStatus,
}

#[derive(Deserialize)]
struct CellsView {
    objects: Vec<IndexerCellView>,
    last_cursor: JsonBytes,
}

#[derive(Deserialize)]
struct IndexerCellView {
    out_point: ckb_jsonrpc_types::OutPoint,
    output: ckb_jsonrpc_types::CellOutput,
    output_data: Option<JsonBytes>,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

fn hex_range(start: u64, end: u64) -> Value {
    json!([format!("{start:#x}"), format!("{end:#x}")])
}

fn encode_error(e: serde_json::Error) -> PortError {
    PortError::Transport(format!("request encoding: {e}"))
}
