#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ckb_types::bytes::Bytes;
use ckb_types::core::{Capacity, TransactionView};
use ckb_types::{h256, packed, prelude::*, H256};

use rusty_sudt_chain_core::{
    udt_amount_to_bytes, CellDepConfig, CellPage, CellQuery, ChainRpcPort, LiveCell, NetworkEnv,
    PortError, ScriptConfig, TxStatus, WaitPort, CKB,
};

/// Wait adapter that counts instead of sleeping.
#[derive(Debug, Default)]
pub struct TestWait {
    waits: AtomicUsize,
}

impl TestWait {
    pub fn count(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

impl WaitPort for TestWait {
    fn wait(&self, _duration: Duration) {
        self.waits.fetch_add(1, Ordering::SeqCst);
    }
}

/// Chain double: a scripted status sequence plus fixed cell sets served
/// through the same paging protocol as the real indexer.
#[derive(Default)]
pub struct MockChain {
    statuses: Mutex<Vec<Option<TxStatus>>>,
    status_queries: AtomicUsize,
    pub capacity_cells: Vec<LiveCell>,
    pub udt_cells: Vec<LiveCell>,
    sent: Mutex<Vec<TransactionView>>,
}

impl MockChain {
    pub fn with_statuses(statuses: Vec<Option<TxStatus>>) -> Self {
        Self {
            statuses: Mutex::new(statuses),
            ..Self::default()
        }
    }

    pub fn status_queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn cell_by_out_point(&self, out_point: &packed::OutPoint) -> Option<&LiveCell> {
        self.capacity_cells
            .iter()
            .chain(self.udt_cells.iter())
            .find(|cell| cell.out_point.as_slice() == out_point.as_slice())
    }
}

impl ChainRpcPort for MockChain {
    fn send_transaction(&self, tx: &TransactionView) -> Result<H256, PortError> {
        let hash = tx.hash().unpack();
        self.sent.lock().unwrap().push(tx.clone());
        Ok(hash)
    }

    fn get_transaction_status(&self, _tx_hash: &H256) -> Result<Option<TxStatus>, PortError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        if statuses.is_empty() {
            return Err(PortError::Transport("status script exhausted".into()));
        }
        Ok(statuses.remove(0))
    }

    fn find_cells(
        &self,
        query: &CellQuery,
        cursor: Option<&[u8]>,
        limit: u32,
    ) -> Result<CellPage, PortError> {
        let source = if query.type_script.is_some() {
            &self.udt_cells
        } else {
            &self.capacity_cells
        };
        let matching: Vec<&LiveCell> = source
            .iter()
            .filter(|cell| cell.output.lock().as_slice() == query.lock.as_slice())
            .collect();

        let offset = cursor
            .map(|c| usize::from_le_bytes(c.try_into().expect("mock cursor")))
            .unwrap_or(0);
        let cells: Vec<LiveCell> = matching
            .iter()
            .skip(offset)
            .take(limit as usize)
            .map(|cell| (*cell).clone())
            .collect();
        let next = offset + cells.len();
        let last_cursor = if cells.is_empty() {
            None
        } else {
            Some(next.to_le_bytes().to_vec())
        };
        Ok(CellPage { cells, last_cursor })
    }
}

pub fn lock_script(tag: u8) -> packed::Script {
    NetworkEnv::Devnet.sighash_lock_script(&[tag; 20])
}

pub fn out_point(seed: u8, index: u32) -> packed::OutPoint {
    packed::OutPoint::new_builder()
        .tx_hash(H256([seed; 32]).pack())
        .index(index.pack())
        .build()
}

pub fn capacity_cell(seed: u8, capacity_ckb: u64, lock: packed::Script) -> LiveCell {
    LiveCell {
        out_point: out_point(seed, 0),
        output: packed::CellOutput::new_builder()
            .capacity(Capacity::shannons(capacity_ckb * CKB).pack())
            .lock(lock)
            .build(),
        data: Bytes::new(),
    }
}

pub fn udt_cell(
    seed: u8,
    capacity_ckb: u64,
    lock: packed::Script,
    udt_type: packed::Script,
    amount: u128,
) -> LiveCell {
    LiveCell {
        out_point: out_point(seed, 1),
        output: packed::CellOutput::new_builder()
            .capacity(Capacity::shannons(capacity_ckb * CKB).pack())
            .lock(lock)
            .type_(Some(udt_type).pack())
            .build(),
        data: Bytes::from(udt_amount_to_bytes(amount).to_vec()),
    }
}

pub fn sudt_config() -> ScriptConfig {
    ScriptConfig {
        code_hash: h256!(
            "0xc5e5dcf215925f7ef4dfaf5f4b4f105bc321c02776d6e7d52a1db3fcd9d011a4"
        ),
        hash_type: "type".to_owned(),
        cell_dep: CellDepConfig {
            tx_hash: h256!(
                "0xe2fb199810d49a4d8beec56718ba2593b665db9d52299a0f9e6e75416d73ff5c"
            ),
            index: 0,
            dep_type: "code".to_owned(),
        },
    }
}

pub fn tx_hash(seed: u8) -> H256 {
    H256([seed; 32])
}
