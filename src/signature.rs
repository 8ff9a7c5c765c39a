//! Detached ed25519 signatures carried in stake record extended IDs.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::collections::HashSet;

use crate::error::{GraderError, Result};

/// Public key (32) followed by signature (64).
pub const SIGNATURE_LEN: usize = 96;
/// Address (52) ‖ signature (64) ‖ public key (32).
pub const DELEGATOR_RECORD_LEN: usize = 148;
const DELEGATOR_ADDRESS_LEN: usize = 52;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedSignature {
    pub public_key: [u8; 32],
    pub signature: [u8; 64],
}

impl DetachedSignature {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() != SIGNATURE_LEN {
            return Err(GraderError::validate(format!(
                "invalid signature length: {}",
                raw.len()
            )));
        }
        let mut public_key = [0u8; 32];
        let mut signature = [0u8; 64];
        public_key.copy_from_slice(&raw[..32]);
        signature.copy_from_slice(&raw[32..]);
        Ok(Self { public_key, signature })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SIGNATURE_LEN);
        out.extend_from_slice(&self.public_key);
        out.extend_from_slice(&self.signature);
        out
    }

    pub fn verify(&self, message: &[u8]) -> Result<()> {
        if verify_raw(&self.public_key, &self.signature, message) {
            Ok(())
        } else {
            Err(GraderError::validate("invalid signature"))
        }
    }
}

fn verify_raw(public_key: &[u8; 32], signature: &[u8; 64], message: &[u8]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    key.verify(message, &Signature::from_bytes(signature)).is_ok()
}

/// Decode a signed delegator block into the addresses that delegated to `signer`.
///
/// The block itself must carry a valid signature. Records whose embedded
/// signature over `signer` does not verify are skipped. Addresses keep their
/// first-seen order with repeats removed.
pub fn delegators_from_block(block: &[u8], block_signature: &[u8], signer: &str) -> Result<Vec<String>> {
    DetachedSignature::from_bytes(block_signature)?
        .verify(block)
        .map_err(|_| GraderError::validate("invalid delegator block signature"))?;

    if block.len() % DELEGATOR_RECORD_LEN != 0 {
        return Err(GraderError::validate(format!(
            "delegator block length {} is not a multiple of {}",
            block.len(),
            DELEGATOR_RECORD_LEN
        )));
    }

    let mut seen = HashSet::new();
    let mut delegators = Vec::new();
    for record in block.chunks_exact(DELEGATOR_RECORD_LEN) {
        let (address, rest) = record.split_at(DELEGATOR_ADDRESS_LEN);
        let (signature, public_key) = rest.split_at(64);

        let (Ok(signature), Ok(public_key)) = (<[u8; 64]>::try_from(signature), <[u8; 32]>::try_from(public_key)) else {
            continue;
        };
        if !verify_raw(&public_key, &signature, signer.as_bytes()) {
            log::debug!("Skipping delegator record with a bad signature for {}", signer);
            continue;
        }
        let Ok(address) = String::from_utf8(address.to_vec()) else {
            continue;
        };
        if seen.insert(address.clone()) {
            delegators.push(address);
        }
    }
    Ok(delegators)
}
