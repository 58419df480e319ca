//! In-process secp256k1 signer for the sighash-all lock.
//!
//! All inputs are assumed to sit under the signer's own lock, so the whole
//! transaction forms a single witness group: the first witness carries the
//! recoverable signature, the rest stay empty.

use ckb_types::bytes::Bytes;
use ckb_types::core::TransactionView;
use ckb_types::{packed, prelude::*, H256};
use secp256k1::ecdsa::RecoverableSignature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, SignOnly};

use rusty_sudt_chain_core::{NetworkEnv, PortError, SignerPort};

const SIGNATURE_LEN: usize = 65;
const BLAKE160_LEN: usize = 20;

#[derive(Debug)]
pub struct PrivateKeySigner {
    env: NetworkEnv,
    secret: SecretKey,
    secp: Secp256k1<SignOnly>,
    lock_args: [u8; BLAKE160_LEN],
}

impl PrivateKeySigner {
    pub fn new(env: NetworkEnv, private_key: &H256) -> Result<Self, PortError> {
        let secret = SecretKey::from_slice(private_key.as_bytes())
            .map_err(|e| PortError::Validation(format!("private key: {e}")))?;
        let secp = Secp256k1::signing_only();
        let pubkey = PublicKey::from_secret_key(&secp, &secret);
        let digest = ckb_hash::blake2b_256(pubkey.serialize());
        let mut lock_args = [0u8; BLAKE160_LEN];
        lock_args.copy_from_slice(&digest[..BLAKE160_LEN]);
        Ok(Self {
            env,
            secret,
            secp,
            lock_args,
        })
    }

    fn sighash_digest(&self, tx: &TransactionView) -> Result<[u8; 32], PortError> {
        let witnesses: Vec<packed::Bytes> = tx.witnesses().into_iter().collect();
        let first = witnesses
            .first()
            .ok_or_else(|| PortError::Validation("transaction has no witnesses".into()))?;
        let witness_args = packed::WitnessArgs::from_slice(&first.raw_data())
            .map_err(|e| PortError::Validation(format!("first witness: {e}")))?;
        let zeroed = witness_args
            .as_builder()
            .lock(Some(Bytes::from(vec![0u8; SIGNATURE_LEN])).pack())
            .build()
            .as_bytes();

        let mut hasher = ckb_hash::new_blake2b();
        hasher.update(tx.hash().as_slice());
        hasher.update(&(zeroed.len() as u64).to_le_bytes());
        hasher.update(&zeroed);
        for witness in &witnesses[1..] {
            let raw = witness.raw_data();
            hasher.update(&(raw.len() as u64).to_le_bytes());
            hasher.update(&raw);
        }
        let mut digest = [0u8; 32];
        hasher.finalize(&mut digest);
        Ok(digest)
    }
}

impl SignerPort for PrivateKeySigner {
    fn lock_script(&self) -> packed::Script {
        self.env.sighash_lock_script(&self.lock_args)
    }

    fn sign_transaction(&self, tx: TransactionView) -> Result<TransactionView, PortError> {
        let digest = self.sighash_digest(&tx)?;
        let message = Message::from_digest(digest);
        let signature: RecoverableSignature = self.secp.sign_ecdsa_recoverable(&message, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();
        let mut sealed = [0u8; SIGNATURE_LEN];
        sealed[..64].copy_from_slice(&compact);
        sealed[64] = recovery_id.to_i32() as u8;

        let mut witnesses: Vec<packed::Bytes> = tx.witnesses().into_iter().collect();
        let first = packed::WitnessArgs::from_slice(&witnesses[0].raw_data())
            .map_err(|e| PortError::Validation(format!("first witness: {e}")))?;
        witnesses[0] = first
            .as_builder()
            .lock(Some(Bytes::from(sealed.to_vec())).pack())
            .build()
            .as_bytes()
            .pack();
        Ok(tx.as_advanced_builder().set_witnesses(witnesses).build())
    }
}
