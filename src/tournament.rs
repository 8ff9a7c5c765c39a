//! Elimination tournament over a candidate window.
//!
//! Each pass grades the first `i` candidates against their own central values
//! and re-sorts them, so the worst record of the pass drops out of the next.

use crate::stats::{central_values, grade};
use crate::submission::Submission;
use crate::version::{MeanStrategy, VersionPolicy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TournamentParams {
    pub band: f64,
    pub mean: MeanStrategy,
    /// The band applies only while the window holds at least this many records.
    pub winner_amount: usize,
    pub min_window: usize,
    pub difficulty_tiebreak: bool,
}

impl From<&VersionPolicy> for TournamentParams {
    fn from(policy: &VersionPolicy) -> Self {
        Self {
            band: policy.band,
            mean: policy.mean,
            winner_amount: policy.winner_amount,
            min_window: policy.min_window,
            difficulty_tiebreak: policy.difficulty_tiebreak,
        }
    }
}

/// Run every pass from the full window down to `min_window`, leaving
/// `candidates` in final rank order.
pub fn run_tournament(candidates: &mut [Submission], params: &TournamentParams) {
    let start = candidates.len();
    if start < params.min_window.max(1) {
        return;
    }

    for i in (params.min_window.max(1)..=start).rev() {
        let window = &mut candidates[..i];
        let central = central_values(window, params.mean);
        let band = if i >= params.winner_amount { params.band } else { 0.0 };

        for sub in window.iter_mut() {
            sub.grade = grade(&sub.prices, &central, band);
        }

        // Stable sorts: grade decides, difficulty breaks ties.
        if params.difficulty_tiebreak {
            window.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
        }
        window.sort_by(|a, b| a.grade.total_cmp(&b.grade));
    }

    log::debug!(
        "Tournament ran {} passes over {} candidates",
        start + 1 - params.min_window.max(1),
        start
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::submission;
    use crate::version::Version;

    fn params(winner_amount: usize, band: f64) -> TournamentParams {
        TournamentParams {
            band,
            mean: MeanStrategy::Arithmetic,
            winner_amount,
            min_window: 1,
            difficulty_tiebreak: true,
        }
    }

    #[test]
    fn test_outlier_ranks_last() {
        let mut subs: Vec<Submission> = (0..6)
            .map(|i: u8| submission(i, 100 - u64::from(i), vec![10.0 + f64::from(i) * 0.01, 5.0]))
            .collect();
        subs.push(submission(99, 1000, vec![50.0, 5.0]));

        run_tournament(&mut subs, &params(3, 0.0));
        assert_eq!(subs.last().unwrap().entry_hash[0], 99);
        assert!(subs.iter().all(|s| s.grade.is_finite()));
    }

    #[test]
    fn test_difficulty_breaks_ties() {
        let mut subs: Vec<Submission> = [3u64, 9, 1, 7]
            .iter()
            .enumerate()
            .map(|(i, &d)| submission(i as u8, d, vec![1.0, 2.0]))
            .collect();

        run_tournament(&mut subs, &params(2, 0.01));
        let order: Vec<u64> = subs.iter().map(|s| s.difficulty).collect();
        assert_eq!(order, vec![9, 7, 3, 1]);
        assert!(subs.iter().all(|s| s.grade == 0.0));
    }

    #[test]
    fn test_stake_ties_keep_input_order() {
        let mut subs: Vec<Submission> = [3u64, 9, 1]
            .iter()
            .enumerate()
            .map(|(i, &d)| submission(i as u8, d, vec![1.0]))
            .collect();
        let mut p = TournamentParams::from(Version::S1.policy());
        p.winner_amount = 2;

        run_tournament(&mut subs, &p);
        let order: Vec<u8> = subs.iter().map(|s| s.entry_hash[0]).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_band_hides_small_deviations_until_below_winner_amount() {
        // All within 1% of the mean; only the unbanded passes separate them.
        let mut subs = vec![
            submission(0, 1, vec![100.4]),
            submission(1, 2, vec![100.0]),
            submission(2, 3, vec![99.8]),
        ];

        run_tournament(&mut subs, &params(3, 0.01));
        // The final pass grades the single survivor against itself.
        assert_eq!(subs[0].grade, 0.0);
        assert_eq!(subs[2].entry_hash[0], 0);
    }

    #[test]
    fn test_minimum_window_is_respected() {
        let mut subs: Vec<Submission> = (0..9u8).map(|i| submission(i, 1, vec![1.0 + f64::from(i)])).collect();
        let before = subs.clone();
        let mut p = TournamentParams::from(Version::V1.policy());
        p.winner_amount = 5;

        run_tournament(&mut subs, &p);
        assert_eq!(subs, before);
    }
}
