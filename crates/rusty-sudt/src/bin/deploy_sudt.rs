//! Deploys the sUDT contract binary as chain cell data and prints the
//! resulting script handle as JSON, ready for `SUDT_SCRIPT_CONFIG`.

use std::{env, fs};

use ckb_types::H256;
use eyre::{bail, WrapErr};

use rusty_sudt_chain_adapters::{AdapterConfig, HttpChainRpc, PrivateKeySigner, SystemWait};
use rusty_sudt_chain_core::{
    confirm_transaction, CellDepConfig, ChainRpcPort, ConfirmationOutcome, ScriptConfig,
    SignerPort, TxAssembler, DEFAULT_FEE_RATE,
};

const DEFAULT_BINARY_PATH: &str = "../build/release/sudt";

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BINARY_PATH.to_owned());
    let binary = fs::read(&path).wrap_err_with(|| format!("reading contract binary {path}"))?;
    tracing::info!("deploying {path} ({} bytes)", binary.len());

    let config = AdapterConfig::from_env()?;
    let client = HttpChainRpc::new(config.rpc_url.clone())?;
    let signer = PrivateKeySigner::new(config.network, &config.private_key)?;

    let assembler = TxAssembler::for_env(&client, config.network, DEFAULT_FEE_RATE);
    let unsigned = assembler.build_deploy(signer.lock_script(), &binary)?;
    let signed = signer.sign_transaction(unsigned)?;
    let tx_hash = client.send_transaction(&signed)?;
    tracing::info!("contract deployed, tx hash: {tx_hash:#x}");

    let outcome = confirm_transaction(&client, &SystemWait, &tx_hash, |_| {}, |_| {})?;
    if outcome != ConfirmationOutcome::Committed {
        bail!("deploy transaction was not committed: {outcome:?}");
    }
    tracing::info!("contract deployment confirmed");

    let contract = ScriptConfig {
        code_hash: H256(ckb_hash::blake2b_256(&binary)),
        hash_type: "type".to_owned(),
        cell_dep: CellDepConfig {
            tx_hash,
            index: 0,
            dep_type: "code".to_owned(),
        },
    };
    println!("{}", serde_json::to_string_pretty(&contract)?);
    Ok(())
}
