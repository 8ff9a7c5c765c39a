//! Deterministic reordering of stake candidates, seeded from the block key.
//!
//! The order depends only on the candidate set and the ledger's block key, so
//! every node derives the same permutation and no submitter can pick it.

use crate::submission::Submission;

const SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

fn prefix24(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(3)
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seed for a candidate set that is already in entry-hash order.
pub fn shuffle_seed(block_key: &[u8; 32], sorted: &[Submission]) -> u64 {
    sorted.iter().fold(SEED_SALT ^ prefix24(block_key), |seed, sub| {
        xorshift(seed ^ prefix24(&sub.entry_hash))
    })
}

/// Reorder `candidates` in place. The result does not depend on their input order.
pub fn shuffle(candidates: &mut [Submission], block_key: &[u8; 32]) {
    candidates.sort_by(|a, b| a.entry_hash.cmp(&b.entry_hash));
    let seed = shuffle_seed(block_key, candidates);
    candidates.sort_by_cached_key(|sub| (mix(seed ^ prefix24(&sub.entry_hash)), sub.entry_hash));
}
