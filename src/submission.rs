use serde::{Serialize, Serializer};

use crate::version::DedupKey;

fn as_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// An accepted price record.
///
/// Everything but `grade`, `position` and `payout` is fixed at acceptance.
/// Those three are only written on the copy owned by a graded block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    #[serde(serialize_with = "as_hex")]
    pub entry_hash: [u8; 32],
    #[serde(serialize_with = "as_hex")]
    pub nonce: Vec<u8>,
    pub difficulty: u64,
    #[serde(serialize_with = "as_hex")]
    pub content_hash: [u8; 32],
    pub coinbase: String,
    pub identity: String,
    pub height: i32,
    /// Prices in asset-table order.
    pub prices: Vec<f64>,
    pub previous_winners: Vec<String>,
    pub delegators: Vec<String>,
    pub grade: f64,
    pub position: Option<usize>,
    pub payout: i64,
}

impl Submission {
    /// Hex of the first 8 bytes of the entry hash.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.entry_hash[..8])
    }

    pub fn dedup_key(&self, key: DedupKey) -> Vec<u8> {
        match key {
            DedupKey::NonceAndContent => {
                let mut out = Vec::with_capacity(self.nonce.len() + self.content_hash.len());
                out.extend_from_slice(&self.nonce);
                out.extend_from_slice(&self.content_hash);
                out
            }
            DedupKey::Coinbase => self.coinbase.as_bytes().to_vec(),
        }
    }
}
