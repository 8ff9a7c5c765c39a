use sha2::{Digest, Sha256};

use crate::content::RecordContent;
use crate::error::{GraderError, Result};
use crate::version::{Family, SignatureRule, Version, VersionPolicy};

pub const ENTRY_HASH_LEN: usize = 32;
pub const NONCE_LEN: usize = 8;

/// Structurally valid entry. Field values have not been checked yet.
#[derive(Debug, Clone)]
pub struct ParsedEntry<'a> {
    pub entry_hash: [u8; 32],
    pub nonce: Vec<u8>,
    pub difficulty: u64,
    pub content: RecordContent,
    pub content_hash: [u8; 32],
    pub raw_content: &'a [u8],
    pub signature: Option<&'a [u8]>,
    pub delegation: Option<Delegation<'a>>,
}

/// Delegator block and the signature over it.
#[derive(Debug, Clone, Copy)]
pub struct Delegation<'a> {
    pub block: &'a [u8],
    pub signature: &'a [u8],
}

pub fn content_hash(raw: &[u8]) -> [u8; 32] {
    Sha256::digest(raw).into()
}

/// Decode one raw entry for `version`.
pub fn parse_entry<'a>(
    version: Version,
    entry_hash: &[u8],
    ext_ids: &'a [Vec<u8>],
    content: &'a [u8],
) -> Result<ParsedEntry<'a>> {
    let policy = version.policy();

    let entry_hash: [u8; 32] = entry_hash.try_into().map_err(|_| {
        GraderError::decode(format!("invalid entry hash length: {}", entry_hash.len()))
    })?;

    if ext_ids.len() != policy.ext_id_count {
        return Err(GraderError::decode(format!(
            "invalid extid count: expected {}, got {}",
            policy.ext_id_count,
            ext_ids.len()
        )));
    }

    let (nonce, difficulty, signature, delegation) = match policy.family {
        Family::Oracle => {
            check_tag(policy, &ext_ids[2])?;
            if ext_ids[0].len() != NONCE_LEN {
                return Err(GraderError::decode("nonce must be 8 bytes"));
            }
            let difficulty: [u8; 8] = ext_ids[1]
                .as_slice()
                .try_into()
                .map_err(|_| GraderError::decode("self reported difficulty must be 8 bytes"))?;
            (ext_ids[0].clone(), u64::from_be_bytes(difficulty), None, None)
        }
        Family::Stake => {
            check_tag(policy, &ext_ids[0])?;
            let delegation = match policy.signature {
                SignatureRule::Delegated => Some(Delegation {
                    block: &ext_ids[3],
                    signature: &ext_ids[4],
                }),
                _ => None,
            };
            (Vec::new(), 0, Some(ext_ids[2].as_slice()), delegation)
        }
    };

    let decoded = RecordContent::decode(policy.encoding, content)?;

    Ok(ParsedEntry {
        entry_hash,
        nonce,
        difficulty,
        content: decoded,
        content_hash: content_hash(content),
        raw_content: content,
        signature,
        delegation,
    })
}

fn check_tag(policy: &VersionPolicy, raw: &[u8]) -> Result<()> {
    match raw {
        [tag] if *tag == policy.tag => Ok(()),
        _ => Err(GraderError::decode(format!(
            "invalid version tag for {}: {}",
            policy.version,
            hex::encode(raw)
        ))),
    }
}
