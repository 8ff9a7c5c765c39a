use crate::dedup::{canonical_order, filter_duplicates};
use crate::difficulty::verify_difficulty;
use crate::error::{GraderError, Result};
use crate::hash::SharedHasher;
use crate::outcome::{assemble, GradedBlock};
use crate::parser::parse_entry;
use crate::shuffle::shuffle;
use crate::submission::Submission;
use crate::tournament::{run_tournament, TournamentParams};
use crate::validation::{check_context, validate_entry};
use crate::version::{Version, VersionPolicy};

pub const DEFAULT_CUTOFF: usize = 50;

/// Collects the records submitted for one block height and grades them.
///
/// A grader is single-writer: `add_submission` and the grading calls take
/// `&mut self`. Graders for different heights share nothing mutable and can
/// run on separate threads.
#[derive(Debug)]
pub struct BlockGrader {
    version: Version,
    height: i32,
    previous_winners: Vec<String>,
    block_key: Option<[u8; 32]>,
    hasher: SharedHasher,
    default_cutoff: usize,
    submissions: Vec<Submission>,
    memo: Option<GradedBlock>,
}

impl BlockGrader {
    pub fn new(
        version: Version,
        height: i32,
        previous_winners: Vec<String>,
        hasher: SharedHasher,
    ) -> Result<Self> {
        Self::build(version, height, previous_winners, None, hasher)
    }

    /// Grader for a height whose block key is known. Required for shuffled versions.
    pub fn with_block_key(
        version: Version,
        height: i32,
        previous_winners: Vec<String>,
        block_key: [u8; 32],
        hasher: SharedHasher,
    ) -> Result<Self> {
        Self::build(version, height, previous_winners, Some(block_key), hasher)
    }

    fn build(
        version: Version,
        height: i32,
        previous_winners: Vec<String>,
        block_key: Option<[u8; 32]>,
        hasher: SharedHasher,
    ) -> Result<Self> {
        if height < 0 {
            return Err(GraderError::NegativeHeight(height));
        }
        check_context(version, &previous_winners)?;
        if version.policy().shuffle && block_key.is_none() {
            return Err(GraderError::MissingBlockKey(version));
        }

        Ok(Self {
            version,
            height,
            previous_winners,
            block_key,
            hasher,
            default_cutoff: DEFAULT_CUTOFF,
            submissions: Vec::new(),
            memo: None,
        })
    }

    /// Window used by `grade()`. Never below the version's winner amount.
    pub fn with_default_cutoff(mut self, cutoff: usize) -> Self {
        self.default_cutoff = cutoff;
        self.memo = None;
        self
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn previous_winners(&self) -> &[String] {
        &self.previous_winners
    }

    /// Accepted records, duplicates included.
    pub fn count(&self) -> usize {
        self.submissions.len()
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn payout(&self, index: usize) -> i64 {
        self.policy().payout(index)
    }

    fn policy(&self) -> &'static VersionPolicy {
        self.version.policy()
    }

    /// Decode, verify and validate one entry. A rejected entry leaves the
    /// grader untouched.
    pub fn add_submission(&mut self, entry_hash: &[u8], ext_ids: &[Vec<u8>], content: &[u8]) -> Result<()> {
        match self.accept(entry_hash, ext_ids, content) {
            Ok(submission) => {
                self.submissions.push(submission);
                self.memo = None;
                Ok(())
            }
            Err(err) => {
                log::debug!(
                    "Rejected {} entry {} at height {}: {}",
                    self.version,
                    hex::encode(entry_hash),
                    self.height,
                    err
                );
                Err(err)
            }
        }
    }

    fn accept(&self, entry_hash: &[u8], ext_ids: &[Vec<u8>], content: &[u8]) -> Result<Submission> {
        let parsed = parse_entry(self.version, entry_hash, ext_ids, content)?;
        if self.policy().requires_difficulty() {
            verify_difficulty(
                self.hasher.as_ref(),
                &parsed.content_hash,
                &parsed.nonce,
                parsed.difficulty,
            )?;
        }
        validate_entry(self.version, parsed, self.height, &self.previous_winners)
    }

    /// Grade with the default window.
    pub fn grade(&mut self) -> GradedBlock {
        let cutoff = self.policy().default_cutoff(self.default_cutoff);
        self.grade_custom(cutoff)
    }

    /// Grade starting from the best `cutoff` candidates.
    ///
    /// The result is memoized per cutoff until the next accepted submission.
    /// Every call hands out its own copy.
    pub fn grade_custom(&mut self, cutoff: usize) -> GradedBlock {
        if let Some(memo) = &self.memo {
            if memo.cutoff == cutoff {
                return memo.clone();
            }
        }

        let block = self.run(cutoff);
        self.memo = Some(block.clone());
        block
    }

    fn run(&self, cutoff: usize) -> GradedBlock {
        let policy = self.policy();

        let mut candidates = self.submissions.clone();
        canonical_order(&mut candidates, policy);
        let mut candidates = filter_duplicates(candidates, policy);

        if let Some(key) = &self.block_key {
            if policy.shuffle {
                shuffle(&mut candidates, key);
            }
        }
        candidates.truncate(cutoff);

        log::debug!(
            "Grading {} block {}: {} accepted, {} in window (cutoff {})",
            self.version,
            self.height,
            self.submissions.len(),
            candidates.len(),
            cutoff
        );

        if candidates.len() >= policy.winner_amount {
            run_tournament(&mut candidates, &TournamentParams::from(policy));
        }

        assemble(
            policy,
            self.height,
            cutoff,
            self.submissions.len(),
            candidates,
            &self.previous_winners,
        )
    }
}
