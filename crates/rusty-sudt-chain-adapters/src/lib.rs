pub mod address;
pub mod config;
pub mod rpc;
pub mod signer;
pub mod wait;

pub use address::{decode_address, encode_address};
pub use config::{AdapterConfig, ConfigError, DEV_PRIVATE_KEY};
pub use rpc::HttpChainRpc;
pub use signer::PrivateKeySigner;
pub use wait::SystemWait;
