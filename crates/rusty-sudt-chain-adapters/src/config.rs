//! Environment-driven configuration for the wallet and the deploy tool.

use std::path::PathBuf;
use std::{env, fs};

use ckb_types::H256;
use thiserror::Error;

use rusty_sudt_chain_core::{NetworkEnv, ScriptConfig};

/// Deterministic dev-chain account, pre-funded by the devnet genesis.
/// Never holds real value; override with `CKB_PRIVATE_KEY` elsewhere.
pub const DEV_PRIVATE_KEY: &str =
    "0x6109170b275a09ad54877b82f7d9930f88cab5717d484fb4741ae9d1dd078cd6";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Runtime wiring resolved from the environment:
///
/// - `CKB_NETWORK`: `devnet` (default), `testnet` or `mainnet`
/// - `CKB_RPC_URL`: node endpoint, defaults per network
/// - `CKB_PRIVATE_KEY`: hex secret key, defaults to the devnet account
/// - `SUDT_SCRIPT_CONFIG`: path to the JSON the deploy tool prints
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub network: NetworkEnv,
    pub rpc_url: String,
    pub private_key: H256,
    pub sudt: Option<ScriptConfig>,
}

impl AdapterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let network = match env::var("CKB_NETWORK") {
            Ok(raw) => NetworkEnv::parse(&raw).ok_or(ConfigError::Invalid {
                name: "CKB_NETWORK",
                reason: format!("unknown network {raw:?}"),
            })?,
            Err(_) => NetworkEnv::Devnet,
        };
        let rpc_url =
            env::var("CKB_RPC_URL").unwrap_or_else(|_| network.default_rpc_url().to_owned());

        let key_hex = env::var("CKB_PRIVATE_KEY").unwrap_or_else(|_| DEV_PRIVATE_KEY.to_owned());
        let private_key = parse_h256(&key_hex).map_err(|reason| ConfigError::Invalid {
            name: "CKB_PRIVATE_KEY",
            reason,
        })?;

        let sudt = match env::var("SUDT_SCRIPT_CONFIG") {
            Ok(path) => Some(load_script_config(PathBuf::from(path))?),
            Err(_) => None,
        };

        Ok(Self {
            network,
            rpc_url,
            private_key,
            sudt,
        })
    }
}

fn load_script_config(path: PathBuf) -> Result<ScriptConfig, ConfigError> {
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Unreadable {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
        name: "SUDT_SCRIPT_CONFIG",
        reason: format!("{}: {e}", path.display()),
    })
}

fn parse_h256(hex: &str) -> Result<H256, String> {
    let trimmed = hex.strip_prefix("0x").unwrap_or(hex);
    trimmed.parse::<H256>().map_err(|e| e.to_string())
}
