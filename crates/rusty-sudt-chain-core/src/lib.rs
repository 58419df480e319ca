pub mod assembler;
pub mod balance;
pub mod domain;
pub mod poller;
pub mod ports;

pub use assembler::TxAssembler;
pub use balance::collect_udt_balance;
pub use domain::{
    udt_amount_from_bytes, udt_amount_to_bytes, CellDepConfig, NetworkEnv, ScriptConfig,
    TxStatus, CKB, CONFIRM_POLL_INTERVAL, DEFAULT_FEE_RATE, DEPLOY_CAPACITY_OVERHEAD_CKB,
    ISSUE_CELL_CAPACITY_CKB, SIGHASH_CODE_HASH, UDT_DATA_LEN,
};
pub use poller::{confirm_transaction, ConfirmationOutcome};
pub use ports::{CellPage, CellQuery, ChainRpcPort, LiveCell, PortError, SignerPort, WaitPort};
