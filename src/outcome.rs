use serde::Serialize;

use crate::submission::Submission;
use crate::version::{Version, VersionPolicy};

/// Result of one grading run. Owns its records outright.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedBlock {
    pub version: Version,
    pub height: i32,
    pub cutoff: usize,
    /// Accepted records before deduplication.
    pub count: usize,
    /// Tournament window in final rank order.
    pub graded: Vec<Submission>,
    pub winner_amount: usize,
    winner_count: usize,
    short_hashes: Vec<String>,
}

impl GradedBlock {
    /// The paid records, or none when too few records were graded.
    pub fn winners(&self) -> &[Submission] {
        &self.graded[..self.winner_count]
    }

    pub fn is_empty(&self) -> bool {
        self.winner_count == 0
    }

    /// Context for the next block: winner short hashes, or the previous
    /// context when this block has no winners.
    pub fn winners_short_hashes(&self) -> &[String] {
        &self.short_hashes
    }

    pub fn total_payout(&self) -> i64 {
        self.graded.iter().map(|s| s.payout).sum()
    }
}

/// Build a graded block from the ranked window.
pub fn assemble(
    policy: &VersionPolicy,
    height: i32,
    cutoff: usize,
    count: usize,
    mut ranked: Vec<Submission>,
    previous_winners: &[String],
) -> GradedBlock {
    let winner_amount = policy.winner_amount;

    if ranked.len() < winner_amount {
        log::info!(
            "{} block {} has {} graded records, {} needed: no winners",
            policy.version,
            height,
            ranked.len(),
            winner_amount
        );
        return GradedBlock {
            version: policy.version,
            height,
            cutoff,
            count,
            graded: ranked,
            winner_amount,
            winner_count: 0,
            short_hashes: previous_winners.to_vec(),
        };
    }

    for (index, sub) in ranked.iter_mut().enumerate() {
        sub.position = Some(index);
        sub.payout = policy.payout(index);
    }
    let short_hashes = ranked[..winner_amount].iter().map(Submission::short_hash).collect();

    GradedBlock {
        version: policy.version,
        height,
        cutoff,
        count,
        graded: ranked,
        winner_amount,
        winner_count: winner_amount,
        short_hashes,
    }
}
