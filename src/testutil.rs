//! Builders for well-formed entries used across the unit tests.

use ed25519_dalek::{Signer, SigningKey};
use once_cell::sync::Lazy;
use prost::Message;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::address::encode_address;
use crate::config::GraderConfig;
use crate::content::{price_to_uint, uint_to_price, JsonContent, ProtoContent};
use crate::difficulty::compute_difficulty;
use crate::hash::{LxrHasher, SharedHasher};
use crate::parser::content_hash;
use crate::signature::DetachedSignature;
use crate::submission::Submission;
use crate::version::{ContentEncoding, Family, SignatureRule, Version};

static HASHER: Lazy<SharedHasher> =
    Lazy::new(|| LxrHasher::shared(&GraderConfig::unit_test().hash).unwrap());

pub fn hasher() -> SharedHasher {
    HASHER.clone()
}

#[derive(Debug, Clone)]
pub struct RawEntry {
    pub entry_hash: Vec<u8>,
    pub ext_ids: Vec<Vec<u8>>,
    pub content: Vec<u8>,
}

fn digest(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

pub fn signing_key(seed: u64) -> SigningKey {
    SigningKey::from_bytes(&digest(&[b"key".as_slice(), &seed.to_be_bytes()]))
}

pub fn sign(key: &SigningKey, message: &[u8]) -> DetachedSignature {
    DetachedSignature {
        public_key: key.verifying_key().to_bytes(),
        signature: key.sign(message).to_bytes(),
    }
}

pub fn address(seed: u64) -> String {
    encode_address(&digest(&[b"address".as_slice(), &seed.to_be_bytes()]))
}

pub fn delegator_record(address: &str, key: &SigningKey, signer: &str) -> Vec<u8> {
    assert_eq!(address.len(), 52);
    let mut record = address.as_bytes().to_vec();
    record.extend_from_slice(&key.sign(signer.as_bytes()).to_bytes());
    record.extend_from_slice(&key.verifying_key().to_bytes());
    record
}

/// `base * (i + 1)` for every asset of `version`.
pub fn prices(version: Version, base: f64) -> Vec<f64> {
    (0..version.policy().assets.len())
        .map(|i| base * (i + 1) as f64)
        .collect()
}

/// Prices within 2% of `prices(version, 1.0)`, fixed by `seed`.
pub fn jittered_prices(version: Version, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    prices(version, 1.0)
        .into_iter()
        .map(|p| p * (1.0 + rng.gen_range(-0.02..0.02)))
        .collect()
}

pub fn entry(version: Version, height: i32, winners: &[String], prices: &[f64], seed: u64) -> RawEntry {
    entry_with(version, height, winners, prices, seed, |_| {})
}

/// Like `entry`, with a hook to edit the record fields before encoding.
pub fn entry_with(
    version: Version,
    height: i32,
    winners: &[String],
    prices: &[f64],
    seed: u64,
    edit: impl FnOnce(&mut ProtoContent),
) -> RawEntry {
    let mut fields = ProtoContent {
        address: address(seed),
        id: format!("miner{}", seed),
        height,
        assets: prices.iter().map(|&p| price_to_uint(p)).collect(),
        winners: winners.iter().map(|w| hex::decode(w).unwrap()).collect(),
    };
    edit(&mut fields);

    let policy = version.policy();
    let content = match policy.encoding {
        ContentEncoding::Json => serde_json::to_vec(&JsonContent {
            coinbase: fields.address.clone(),
            height: fields.height,
            winners: fields.winners.iter().map(hex::encode).collect(),
            identity: fields.id.clone(),
            assets: policy
                .assets
                .iter()
                .zip(&fields.assets)
                .map(|(name, &v)| (name.to_string(), uint_to_price(v)))
                .collect(),
        })
        .unwrap(),
        ContentEncoding::Protobuf => fields.encode_to_vec(),
    };
    entry_from_content(version, content, seed)
}

/// Stake entry carrying a signed block of `delegators` valid delegator records.
pub fn delegated_entry(version: Version, height: i32, prices: &[f64], seed: u64, delegators: usize) -> RawEntry {
    let mut raw = entry(version, height, &[], prices, seed);
    let signer = address(seed);
    let mut block = Vec::new();
    for k in 0..delegators as u64 {
        let delegator_seed = seed * 1_000 + k + 1;
        block.extend(delegator_record(&address(delegator_seed), &signing_key(delegator_seed), &signer));
    }
    raw.ext_ids[4] = sign(&signing_key(seed), &block).to_bytes();
    raw.ext_ids[3] = block;
    raw
}

/// Wrap already-encoded content with valid ext ids (difficulty or signatures).
pub fn entry_from_content(version: Version, content: Vec<u8>, seed: u64) -> RawEntry {
    let policy = version.policy();
    let entry_hash = digest(&[seed.to_be_bytes().as_slice(), content.as_slice()]).to_vec();

    let ext_ids = match policy.family {
        Family::Oracle => {
            let nonce = seed.to_be_bytes().to_vec();
            let difficulty = compute_difficulty(hasher().as_ref(), &content_hash(&content), &nonce);
            vec![nonce, difficulty.to_be_bytes().to_vec(), vec![policy.tag]]
        }
        Family::Stake => {
            let key = signing_key(seed);
            let mut ids = vec![vec![policy.tag], Vec::new(), sign(&key, &content).to_bytes()];
            if policy.signature == SignatureRule::Delegated {
                ids.push(Vec::new());
                ids.push(sign(&key, &[]).to_bytes());
            }
            ids
        }
    };

    RawEntry { entry_hash, ext_ids, content }
}

/// Bare accepted record for exercising the grading stages directly.
pub fn submission(tag: u8, difficulty: u64, prices: Vec<f64>) -> Submission {
    let mut entry_hash = [0u8; 32];
    entry_hash[0] = tag;
    Submission {
        entry_hash,
        nonce: vec![tag; 8],
        difficulty,
        content_hash: [0; 32],
        coinbase: format!("FA-{}", tag),
        identity: format!("miner{}", tag),
        height: 1,
        prices,
        previous_winners: Vec::new(),
        delegators: Vec::new(),
        grade: 0.0,
        position: None,
        payout: 0,
    }
}
