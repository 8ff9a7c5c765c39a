use std::collections::HashSet;

use crate::submission::Submission;
use crate::version::VersionPolicy;

/// Put candidates in the order every node agrees on before deduplication.
///
/// Proof-of-work records go by difficulty, highest first; stake records and
/// equal difficulties fall back to the entry hash.
pub fn canonical_order(candidates: &mut [Submission], policy: &VersionPolicy) {
    if policy.difficulty_tiebreak {
        candidates.sort_by(|a, b| {
            b.difficulty
                .cmp(&a.difficulty)
                .then_with(|| a.entry_hash.cmp(&b.entry_hash))
        });
    } else {
        candidates.sort_by(|a, b| a.entry_hash.cmp(&b.entry_hash));
    }
}

/// Keep the first record seen for each dedup key.
pub fn filter_duplicates(candidates: Vec<Submission>, policy: &VersionPolicy) -> Vec<Submission> {
    let before = candidates.len();
    let mut seen = HashSet::with_capacity(before);
    let filtered: Vec<Submission> = candidates
        .into_iter()
        .filter(|sub| seen.insert(sub.dedup_key(policy.dedup_key)))
        .collect();

    if filtered.len() < before {
        log::debug!("Dropped {} duplicate records", before - filtered.len());
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::submission;
    use crate::version::Version;

    #[test]
    fn test_canonical_order_oracle() {
        let mut subs = vec![
            submission(3, 5, vec![]),
            submission(1, 9, vec![]),
            submission(2, 5, vec![]),
        ];
        canonical_order(&mut subs, Version::V2.policy());
        let order: Vec<u8> = subs.iter().map(|s| s.entry_hash[0]).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_canonical_order_stake_ignores_difficulty() {
        let mut subs = vec![submission(3, 1, vec![]), submission(1, 0, vec![]), submission(2, 9, vec![])];
        canonical_order(&mut subs, Version::S2.policy());
        let order: Vec<u8> = subs.iter().map(|s| s.entry_hash[0]).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_nonce_and_content_keeps_highest_difficulty() {
        let policy = Version::V3.policy();
        let mut low = submission(1, 10, vec![]);
        let mut high = submission(2, 20, vec![]);
        low.nonce = vec![4; 8];
        high.nonce = vec![4; 8];
        let unrelated = submission(3, 15, vec![]);

        let mut subs = vec![low, unrelated, high];
        canonical_order(&mut subs, policy);
        let kept = filter_duplicates(subs, policy);

        let order: Vec<u8> = kept.iter().map(|s| s.entry_hash[0]).collect();
        assert_eq!(order, vec![2, 3]);
    }

    #[test]
    fn test_same_nonce_different_content_is_kept() {
        let policy = Version::V3.policy();
        let a = submission(1, 10, vec![]);
        let mut b = submission(2, 10, vec![]);
        b.nonce = a.nonce.clone();
        b.content_hash = [9; 32];
        assert_eq!(filter_duplicates(vec![a, b], policy).len(), 2);
    }

    #[test]
    fn test_stake_dedup_by_coinbase() {
        let policy = Version::S1.policy();
        let mut a = submission(1, 0, vec![]);
        let mut b = submission(2, 0, vec![]);
        let mut c = submission(3, 0, vec![]);
        a.coinbase = "FA-one".to_string();
        b.coinbase = "FA-one".to_string();
        c.coinbase = "FA-two".to_string();
        b.nonce = vec![1];

        let kept = filter_duplicates(vec![a, b, c], policy);
        let order: Vec<u8> = kept.iter().map(|s| s.entry_hash[0]).collect();
        assert_eq!(order, vec![1, 3]);
    }
}
