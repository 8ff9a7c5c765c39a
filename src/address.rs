use sha2::{Digest, Sha256};

use crate::error::{GraderError, Result};

pub const ADDRESS_PREFIX: [u8; 2] = [0x5f, 0xb1];
const DECODED_LEN: usize = 2 + 32 + 4;

fn checksum(body: &[u8]) -> [u8; 4] {
    let once = Sha256::digest(body);
    let twice = Sha256::digest(once);
    let mut out = [0u8; 4];
    out.copy_from_slice(&twice[..4]);
    out
}

/// Check that `address` is a base58 factoid address with a valid checksum.
pub fn validate_address(address: &str) -> Result<()> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|_| GraderError::validate("address must be in base58"))?;
    if data.is_empty() {
        return Err(GraderError::validate("address must be in base58"));
    }

    if data.len() != DECODED_LEN {
        return Err(GraderError::validate("address is of wrong length"));
    }

    if data[..2] != ADDRESS_PREFIX {
        return Err(GraderError::validate("address has wrong prefix"));
    }

    if data[34..] != checksum(&data[..34]) {
        return Err(GraderError::validate("address checksum is not correct"));
    }

    Ok(())
}

/// Render a 32-byte RCD hash as a factoid address.
pub fn encode_address(rcd_hash: &[u8; 32]) -> String {
    let mut data = Vec::with_capacity(DECODED_LEN);
    data.extend_from_slice(&ADDRESS_PREFIX);
    data.extend_from_slice(rcd_hash);
    let sum = checksum(&data);
    data.extend_from_slice(&sum);
    bs58::encode(data).into_string()
}
