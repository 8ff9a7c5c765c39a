use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::assets::{V1_ASSETS, V2_ASSETS, V4_ASSETS, V5_ASSETS};
use crate::error::{GraderError, Result};

/// Base units per whole PEG.
pub const PEGTOSHI: i64 = 100_000_000;

/// Every protocol version the grader understands.
///
/// Oracle and stake versions use overlapping on-chain tags (V5 and S1 are
/// both tag 5), so a version is resolved from its tag together with the
/// chain family it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    V1,
    V2,
    V3,
    V4,
    V5,
    S1,
    S2,
    S3,
    S4,
}

impl Version {
    pub const ALL: [Version; 9] = [
        Version::V1,
        Version::V2,
        Version::V3,
        Version::V4,
        Version::V5,
        Version::S1,
        Version::S2,
        Version::S3,
        Version::S4,
    ];

    pub fn from_oracle_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Version::V1),
            2 => Ok(Version::V2),
            3 => Ok(Version::V3),
            4 => Ok(Version::V4),
            5 => Ok(Version::V5),
            other => Err(GraderError::UnsupportedVersion(format!("oracle tag {}", other))),
        }
    }

    pub fn from_stake_tag(tag: u8) -> Result<Self> {
        match tag {
            5 => Ok(Version::S1),
            6 => Ok(Version::S2),
            7 => Ok(Version::S3),
            8 => Ok(Version::S4),
            other => Err(GraderError::UnsupportedVersion(format!("stake tag {}", other))),
        }
    }

    pub fn policy(&self) -> &'static VersionPolicy {
        &POLICIES[*self as usize]
    }

    pub fn tag(&self) -> u8 {
        self.policy().tag
    }

    pub fn is_stake(&self) -> bool {
        self.policy().family == Family::Stake
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Version {
    type Err = GraderError;

    fn from_str(s: &str) -> Result<Self> {
        Version::ALL
            .iter()
            .copied()
            .find(|v| v.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GraderError::UnsupportedVersion(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Family {
    /// Proof-of-work price records
    Oracle,
    /// Signed stake price records
    Stake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentEncoding {
    Json,
    Protobuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DedupKey {
    /// Nonce followed by the content hash.
    NonceAndContent,
    /// One record per coinbase address.
    Coinbase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeanStrategy {
    Arithmetic,
    Trimmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureRule {
    None,
    /// Detached key+signature over the content.
    Detached,
    /// Detached signature plus a signed delegator block.
    Delegated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PayoutTable {
    /// 800, 600, then 450 PEG.
    Tiered,
    /// The same amount, in whole PEG, for every paid position.
    Flat(i64),
}

impl PayoutTable {
    pub fn amount(&self, index: usize, winner_amount: usize) -> i64 {
        if index >= winner_amount {
            return 0;
        }
        match self {
            PayoutTable::Tiered => match index {
                0 => 800 * PEGTOSHI,
                1 => 600 * PEGTOSHI,
                _ => 450 * PEGTOSHI,
            },
            PayoutTable::Flat(peg) => peg * PEGTOSHI,
        }
    }
}

/// Static per-version grading parameters.
#[derive(Debug, Clone, Serialize)]
pub struct VersionPolicy {
    pub version: Version,
    pub tag: u8,
    pub family: Family,
    pub encoding: ContentEncoding,
    pub assets: &'static [&'static str],
    pub winner_amount: usize,
    /// Previous-winner list lengths accepted in a record. Empty when unchecked.
    pub previous_winner_counts: &'static [usize],
    /// The single asset allowed to carry a zero price, if any.
    pub zero_exempt_index: Option<usize>,
    pub check_address: bool,
    pub check_identity: bool,
    pub ext_id_count: usize,
    pub band: f64,
    pub mean: MeanStrategy,
    pub min_window: usize,
    pub difficulty_tiebreak: bool,
    pub dedup_key: DedupKey,
    pub signature: SignatureRule,
    pub shuffle: bool,
    pub payout: PayoutTable,
}

impl VersionPolicy {
    pub fn payout(&self, index: usize) -> i64 {
        self.payout.amount(index, self.winner_amount)
    }

    /// Window size `grade()` starts from when no cutoff is given.
    pub fn default_cutoff(&self, configured: usize) -> usize {
        configured.max(self.winner_amount)
    }

    pub fn requires_difficulty(&self) -> bool {
        self.family == Family::Oracle
    }
}

const fn oracle(
    version: Version,
    tag: u8,
    encoding: ContentEncoding,
    assets: &'static [&'static str],
    winner_amount: usize,
    previous_winner_counts: &'static [usize],
    zero_exempt_index: Option<usize>,
    strict: bool,
    band: f64,
    mean: MeanStrategy,
    min_window: usize,
    payout: PayoutTable,
) -> VersionPolicy {
    VersionPolicy {
        version,
        tag,
        family: Family::Oracle,
        encoding,
        assets,
        winner_amount,
        previous_winner_counts,
        zero_exempt_index,
        check_address: strict,
        check_identity: strict,
        ext_id_count: 3,
        band,
        mean,
        min_window,
        difficulty_tiebreak: true,
        dedup_key: DedupKey::NonceAndContent,
        signature: SignatureRule::None,
        shuffle: false,
        payout,
    }
}

const fn stake(
    version: Version,
    tag: u8,
    winner_amount: usize,
    mean: MeanStrategy,
    signature: SignatureRule,
    shuffle: bool,
) -> VersionPolicy {
    VersionPolicy {
        version,
        tag,
        family: Family::Stake,
        encoding: ContentEncoding::Protobuf,
        assets: V5_ASSETS,
        winner_amount,
        previous_winner_counts: &[],
        zero_exempt_index: None,
        check_address: true,
        check_identity: false,
        ext_id_count: match signature {
            SignatureRule::Delegated => 5,
            _ => 3,
        },
        band: 0.01,
        mean,
        min_window: 1,
        difficulty_tiebreak: false,
        dedup_key: DedupKey::Coinbase,
        signature,
        shuffle,
        payout: PayoutTable::Flat(180),
    }
}

// Indexed by `Version as usize`.
static POLICIES: [VersionPolicy; 9] = [
    oracle(Version::V1, 1, ContentEncoding::Json, V1_ASSETS, 10, &[10], Some(0), false, 0.0, MeanStrategy::Arithmetic, 10, PayoutTable::Tiered),
    oracle(Version::V2, 2, ContentEncoding::Protobuf, V2_ASSETS, 25, &[10, 25], Some(0), false, 0.01, MeanStrategy::Arithmetic, 1, PayoutTable::Flat(200)),
    oracle(Version::V3, 3, ContentEncoding::Protobuf, V2_ASSETS, 25, &[10, 25], None, true, 0.01, MeanStrategy::Arithmetic, 1, PayoutTable::Flat(200)),
    oracle(Version::V4, 4, ContentEncoding::Protobuf, V4_ASSETS, 25, &[25], None, true, 0.01, MeanStrategy::Arithmetic, 1, PayoutTable::Flat(200)),
    oracle(Version::V5, 5, ContentEncoding::Protobuf, V5_ASSETS, 25, &[25], None, true, 0.01, MeanStrategy::Trimmed, 1, PayoutTable::Flat(360)),
    stake(Version::S1, 5, 25, MeanStrategy::Arithmetic, SignatureRule::Detached, false),
    stake(Version::S2, 6, 25, MeanStrategy::Arithmetic, SignatureRule::Detached, false),
    stake(Version::S3, 7, 25, MeanStrategy::Arithmetic, SignatureRule::Detached, true),
    stake(Version::S4, 8, 100, MeanStrategy::Trimmed, SignatureRule::Delegated, false),
];
