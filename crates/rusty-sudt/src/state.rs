//! Application state types
//!
//! Per-tab UI state structs; chain types come from the workspace crates.

use ckb_types::H256;

/// Progress reports from a spawned transaction flow.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    Submitted(H256),
    Confirmed(H256),
    Failed(String),
}

/// Lifecycle of one submit-and-confirm flow, shared by Issue and Transfer.
#[derive(Debug, Default)]
pub struct FlowProgress {
    /// Set while the worker thread is building, sending or polling.
    pub processing: bool,
    /// Hash of the submitted transaction, once broadcast.
    pub submitted: Option<H256>,
    /// Hash of the committed transaction.
    pub confirmed: Option<H256>,
    pub error: Option<String>,
}

impl FlowProgress {
    pub fn begin(&mut self) {
        self.processing = true;
        self.submitted = None;
        self.confirmed = None;
        self.error = None;
    }

    pub fn apply(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::Submitted(hash) => self.submitted = Some(hash),
            FlowEvent::Confirmed(hash) => {
                self.confirmed = Some(hash);
                self.processing = false;
            }
            FlowEvent::Failed(message) => {
                self.error = Some(message);
                self.processing = false;
            }
        }
    }
}

/// Issue tab: mint tokens to the signer's own lock.
#[derive(Debug, Default)]
pub struct IssueState {
    pub amount: String,
    pub progress: FlowProgress,
}

/// Transfer tab: move tokens to a recipient address.
#[derive(Debug, Default)]
pub struct TransferState {
    pub recipient: String,
    pub amount: String,
    pub progress: FlowProgress,
}

/// Balance tab: aggregate of the sUDT cells under a queried lock.
#[derive(Debug, Default)]
pub struct BalanceState {
    /// Address to query; empty means the signer's own.
    pub address: String,
    pub loading: bool,
    pub total: Option<u128>,
    pub error: Option<String>,
}
