//! CKB address codec.
//!
//! Encoding always emits the full bech32m format (payload
//! `0x00 | code_hash | hash_type | args`). Decoding also accepts the
//! deprecated short secp256k1 format still printed by older tooling.

use bech32::{Bech32m, Hrp};
use ckb_types::core::ScriptHashType;
use ckb_types::{packed, prelude::*};

use rusty_sudt_chain_core::{NetworkEnv, PortError};

const FORMAT_FULL: u8 = 0x00;
const FORMAT_SHORT: u8 = 0x01;
const SHORT_INDEX_SIGHASH: u8 = 0x00;

pub fn encode_address(script: &packed::Script, env: NetworkEnv) -> Result<String, PortError> {
    let hash_type: u8 = script.hash_type().into();
    let args = script.args().raw_data();

    let mut payload = Vec::with_capacity(2 + 32 + args.len());
    payload.push(FORMAT_FULL);
    payload.extend_from_slice(script.code_hash().as_slice());
    payload.push(hash_type);
    payload.extend_from_slice(&args);

    let hrp = Hrp::parse(env.address_hrp())
        .map_err(|e| PortError::Validation(format!("address hrp: {e}")))?;
    bech32::encode::<Bech32m>(hrp, &payload)
        .map_err(|e| PortError::Validation(format!("address encoding: {e}")))
}

pub fn decode_address(address: &str, env: NetworkEnv) -> Result<packed::Script, PortError> {
    let (hrp, payload) = bech32::decode(address)
        .map_err(|e| PortError::Validation(format!("address decoding: {e}")))?;
    if hrp.as_str() != env.address_hrp() {
        return Err(PortError::Validation(format!(
            "address prefix {hrp} does not match the {env} network"
        )));
    }

    match payload.first() {
        Some(&FORMAT_FULL) => full_payload_script(&payload[1..]),
        Some(&FORMAT_SHORT) => short_payload_script(&payload[1..], env),
        _ => Err(PortError::Validation("unsupported address format".into())),
    }
}

fn full_payload_script(payload: &[u8]) -> Result<packed::Script, PortError> {
    if payload.len() < 33 {
        return Err(PortError::Validation("truncated address payload".into()));
    }
    let code_hash = packed::Byte32::from_slice(&payload[..32])
        .map_err(|e| PortError::Validation(format!("address code hash: {e}")))?;
    let hash_type = match payload[32] {
        0 => ScriptHashType::Data,
        1 => ScriptHashType::Type,
        2 => ScriptHashType::Data1,
        4 => ScriptHashType::Data2,
        other => {
            return Err(PortError::Validation(format!(
                "unknown address hash type byte: {other}"
            )))
        }
    };
    Ok(packed::Script::new_builder()
        .code_hash(code_hash)
        .hash_type(hash_type.into())
        .args(payload[33..].pack())
        .build())
}

fn short_payload_script(payload: &[u8], env: NetworkEnv) -> Result<packed::Script, PortError> {
    match payload.first() {
        Some(&SHORT_INDEX_SIGHASH) if payload.len() == 21 => {
            Ok(env.sighash_lock_script(&payload[1..]))
        }
        _ => Err(PortError::Validation(
            "short address must be a 20-byte sighash payload".into(),
        )),
    }
}
