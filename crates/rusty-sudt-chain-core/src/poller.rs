//! Fixed-interval confirmation polling.
//!
//! The loop is intentionally naive: a 5 second interval, no backoff, no
//! retry bound and no cancellation. A non-terminal status keeps polling
//! forever; the first terminal status fires exactly one of the callbacks.

use ckb_types::H256;

use crate::domain::{TxStatus, CONFIRM_POLL_INTERVAL};
use crate::ports::{ChainRpcPort, PortError, WaitPort};

/// Terminal result of a confirmation poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Committed,
    /// The transaction reached a non-success status, or the node does not
    /// know it at all (`None`).
    Failed(Option<TxStatus>),
}

/// Poll `tx_hash` until it reaches a terminal state.
///
/// `on_committed` fires exactly once when the status becomes `committed`;
/// `on_failed` fires exactly once on any other terminal status, including
/// a transaction the node has never seen. While the status is `pending` or
/// `proposed` the loop waits one interval and queries again, indefinitely.
/// Transport errors propagate without invoking either callback.
pub fn confirm_transaction<C, W>(
    client: &C,
    wait: &W,
    tx_hash: &H256,
    on_committed: impl FnOnce(&H256),
    on_failed: impl FnOnce(&H256),
) -> Result<ConfirmationOutcome, PortError>
where
    C: ChainRpcPort + ?Sized,
    W: WaitPort + ?Sized,
{
    loop {
        match client.get_transaction_status(tx_hash)? {
            Some(TxStatus::Committed) => {
                tracing::info!("transaction confirmed: {tx_hash:#x}");
                on_committed(tx_hash);
                return Ok(ConfirmationOutcome::Committed);
            }
            Some(status @ (TxStatus::Pending | TxStatus::Proposed)) => {
                tracing::debug!("transaction still {status}, waiting");
                wait.wait(CONFIRM_POLL_INTERVAL);
            }
            other => {
                match other {
                    Some(status) => {
                        tracing::warn!("transaction failed or in unexpected status: {status}")
                    }
                    None => tracing::warn!("transaction not found: {tx_hash:#x}"),
                }
                on_failed(tx_hash);
                return Ok(ConfirmationOutcome::Failed(other));
            }
        }
    }
}
