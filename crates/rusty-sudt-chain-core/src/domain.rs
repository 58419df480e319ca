//! Chain-facing domain types shared by the wallet panels and the deploy tool.

use std::fmt;
use std::time::Duration;

use ckb_types::core::{DepType, ScriptHashType};
use ckb_types::{h256, packed, prelude::*, H256};
use serde::{Deserialize, Serialize};

/// One CKByte in shannons.
pub const CKB: u64 = 100_000_000;

/// How often the confirmation poller re-queries transaction status.
pub const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Fee rate in shannons per 1000 bytes of serialized transaction.
pub const DEFAULT_FEE_RATE: u64 = 1000;

/// Capacity of a freshly issued sUDT cell, in CKBytes.
pub const ISSUE_CELL_CAPACITY_CKB: u64 = 200;

/// Extra CKBytes a deploy cell needs on top of the binary itself
/// (61 for the bare cell, 65 headroom for the witness signature).
pub const DEPLOY_CAPACITY_OVERHEAD_CKB: u64 = 61 + 65;

/// Length of an sUDT amount payload: a little-endian u128.
pub const UDT_DATA_LEN: usize = 16;

/// Encode a token amount as sUDT cell data.
pub fn udt_amount_to_bytes(amount: u128) -> [u8; UDT_DATA_LEN] {
    amount.to_le_bytes()
}

/// Decode a token amount from sUDT cell data. Cells with short data are
/// not valid sUDT cells and yield `None`.
pub fn udt_amount_from_bytes(data: &[u8]) -> Option<u128> {
    let raw: [u8; UDT_DATA_LEN] = data.get(..UDT_DATA_LEN)?.try_into().ok()?;
    Some(u128::from_le_bytes(raw))
}

/// Transaction status as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Proposed,
    Committed,
    Unknown,
    Rejected,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxStatus::Pending => "pending",
            TxStatus::Proposed => "proposed",
            TxStatus::Committed => "committed",
            TxStatus::Unknown => "unknown",
            TxStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Network-environment selector. Every chain access goes through a client
/// built from one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkEnv {
    Devnet,
    Testnet,
    Mainnet,
}

/// The secp256k1-blake160 sighash-all lock script code hash, identical on
/// every CKB network.
pub const SIGHASH_CODE_HASH: H256 =
    h256!("0x9bd7e06f3ecf4be0f2fcd2188b23f1b9fcc88e5d4b65a8637b17723bbda3cce8");

impl NetworkEnv {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" => Some(Self::Devnet),
            "testnet" => Some(Self::Testnet),
            "mainnet" => Some(Self::Mainnet),
            _ => None,
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Devnet => "http://127.0.0.1:8114",
            Self::Testnet => "https://testnet.ckb.dev",
            Self::Mainnet => "https://mainnet.ckb.dev",
        }
    }

    /// Bech32 human-readable part used by addresses on this network.
    pub fn address_hrp(&self) -> &'static str {
        match self {
            Self::Mainnet => "ckb",
            Self::Devnet | Self::Testnet => "ckt",
        }
    }

    /// Dep group holding the sighash-all lock script code. The devnet value
    /// is the deterministic dev-chain genesis; override it through
    /// configuration when running against a custom chain.
    pub fn sighash_dep_group(&self) -> packed::OutPoint {
        let tx_hash: H256 = match self {
            Self::Devnet => {
                h256!("0xace5ea83c478bb866edf122ff862085789158f5cbff155b7bb5f13058555b708")
            }
            Self::Testnet => {
                h256!("0xf8de3bb47d055cdf460d93a2a6e1b05f7432f9777c8c474abf4eec1d4aee5d37")
            }
            Self::Mainnet => {
                h256!("0x71a7ba8fc96349fea0ed3a5c47992e3b4084b031a42264a018e0072e8172e46c")
            }
        };
        packed::OutPoint::new_builder()
            .tx_hash(tx_hash.pack())
            .index(0u32.pack())
            .build()
    }

    pub fn sighash_cell_dep(&self) -> packed::CellDep {
        packed::CellDep::new_builder()
            .out_point(self.sighash_dep_group())
            .dep_type(DepType::DepGroup.into())
            .build()
    }

    /// Lock script paying to a blake160 public key hash.
    pub fn sighash_lock_script(&self, args: &[u8]) -> packed::Script {
        packed::Script::new_builder()
            .code_hash(SIGHASH_CODE_HASH.pack())
            .hash_type(ScriptHashType::Type.into())
            .args(args.pack())
            .build()
    }
}

impl fmt::Display for NetworkEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        };
        f.write_str(s)
    }
}

/// Handle to a deployed contract: enough to build its type script and the
/// cell dep referencing its code. The deploy tool prints one of these; the
/// issue and transfer flows consume it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub code_hash: H256,
    pub hash_type: String,
    pub cell_dep: CellDepConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDepConfig {
    pub tx_hash: H256,
    pub index: u32,
    pub dep_type: String,
}

impl ScriptConfig {
    /// Type script for this contract with the given args.
    pub fn type_script(&self, args: &[u8]) -> Result<packed::Script, String> {
        let hash_type = parse_hash_type(&self.hash_type)?;
        Ok(packed::Script::new_builder()
            .code_hash(self.code_hash.pack())
            .hash_type(hash_type.into())
            .args(args.pack())
            .build())
    }

    pub fn cell_dep(&self) -> Result<packed::CellDep, String> {
        let dep_type = match self.cell_dep.dep_type.as_str() {
            "code" => DepType::Code,
            "dep_group" | "depGroup" => DepType::DepGroup,
            other => return Err(format!("unknown dep type: {other}")),
        };
        let out_point = packed::OutPoint::new_builder()
            .tx_hash(self.cell_dep.tx_hash.pack())
            .index(self.cell_dep.index.pack())
            .build();
        Ok(packed::CellDep::new_builder()
            .out_point(out_point)
            .dep_type(dep_type.into())
            .build())
    }
}

fn parse_hash_type(s: &str) -> Result<ScriptHashType, String> {
    match s {
        "data" => Ok(ScriptHashType::Data),
        "type" => Ok(ScriptHashType::Type),
        "data1" => Ok(ScriptHashType::Data1),
        "data2" => Ok(ScriptHashType::Data2),
        other => Err(format!("unknown hash type: {other}")),
    }
}
