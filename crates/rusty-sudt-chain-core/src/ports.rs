//! Boundaries to the outside world: the node's RPC surface, the signer and
//! the poller's timer. Adapters live in `rusty-sudt-chain-adapters`; tests
//! substitute scripted doubles.

use std::time::Duration;

use ckb_types::bytes::Bytes;
use ckb_types::core::TransactionView;
use ckb_types::prelude::Unpack;
use ckb_types::{packed, H256};
use thiserror::Error;

use crate::domain::TxStatus;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
}

/// A live cell as returned by the indexer, with its data when requested.
#[derive(Debug, Clone)]
pub struct LiveCell {
    pub out_point: packed::OutPoint,
    pub output: packed::CellOutput,
    pub data: Bytes,
}

impl LiveCell {
    pub fn capacity(&self) -> u64 {
        self.output.capacity().unpack()
    }
}

/// Cell-search-by-script query. Ranges are half-open `[start, end)` byte
/// lengths, matching the indexer's filter semantics.
#[derive(Debug, Clone)]
pub struct CellQuery {
    pub lock: packed::Script,
    pub type_script: Option<packed::Script>,
    pub data_len_range: Option<(u64, u64)>,
    pub type_len_range: Option<(u64, u64)>,
    pub with_data: bool,
}

impl CellQuery {
    /// Plain capacity-bearing cells under a lock: no type script, no data.
    pub fn capacity_cells(lock: packed::Script) -> Self {
        Self {
            lock,
            type_script: None,
            data_len_range: Some((0, 1)),
            type_len_range: Some((0, 1)),
            with_data: false,
        }
    }

    /// Token cells under a lock for a concrete sUDT type script.
    pub fn udt_cells(lock: packed::Script, udt_type: packed::Script) -> Self {
        Self {
            lock,
            type_script: Some(udt_type),
            data_len_range: Some((crate::domain::UDT_DATA_LEN as u64, u64::from(u32::MAX))),
            type_len_range: None,
            with_data: true,
        }
    }
}

/// One page of indexer results plus the cursor to resume from.
#[derive(Debug, Clone, Default)]
pub struct CellPage {
    pub cells: Vec<LiveCell>,
    pub last_cursor: Option<Vec<u8>>,
}

/// The external client boundary: submission, lookup by hash and
/// cell search. The wire protocol behind it is the node's business.
pub trait ChainRpcPort {
    fn send_transaction(&self, tx: &TransactionView) -> Result<H256, PortError>;

    /// `None` when the node has never seen the transaction.
    fn get_transaction_status(&self, tx_hash: &H256) -> Result<Option<TxStatus>, PortError>;

    fn find_cells(
        &self,
        query: &CellQuery,
        cursor: Option<&[u8]>,
        limit: u32,
    ) -> Result<CellPage, PortError>;
}

/// Witness signing for a fully assembled transaction.
pub trait SignerPort {
    fn lock_script(&self) -> packed::Script;
    fn sign_transaction(&self, tx: TransactionView) -> Result<TransactionView, PortError>;
}

/// The poller's suspension point. The production adapter sleeps; tests count.
pub trait WaitPort {
    fn wait(&self, duration: Duration);
}
