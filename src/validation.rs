//! Semantic checks applied to a structurally valid entry before it is accepted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::address::validate_address;
use crate::error::{GraderError, Result};
use crate::parser::ParsedEntry;
use crate::signature::{delegators_from_block, DetachedSignature};
use crate::submission::Submission;
use crate::version::{Family, SignatureRule, Version, VersionPolicy};

static IDENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9,]+$").expect("identity pattern compiles"));

/// `length` entries, either all empty or all 16-character hex.
pub fn verify_winner_format(winners: &[String], length: usize) -> bool {
    if winners.len() != length {
        return false;
    }
    let populated = winners.first().map_or(false, |w| !w.is_empty());
    winners.iter().all(|w| {
        if populated {
            w.len() == 16 && w.bytes().all(|b| b.is_ascii_hexdigit())
        } else {
            w.is_empty()
        }
    })
}

/// Check a previous-winner list against the lengths `policy` accepts.
pub fn check_winner_list(policy: &VersionPolicy, winners: &[String]) -> Result<()> {
    if policy
        .previous_winner_counts
        .iter()
        .any(|&n| verify_winner_format(winners, n))
    {
        return Ok(());
    }
    Err(GraderError::validate(format!(
        "invalid list of previous winners: {} entries, accepted lengths {:?}",
        winners.len(),
        policy.previous_winner_counts
    )))
}

/// The "no prior winners" context for a version.
pub fn empty_context(version: Version) -> Vec<String> {
    let policy = version.policy();
    let len = policy
        .previous_winner_counts
        .last()
        .copied()
        .unwrap_or(policy.winner_amount);
    vec![String::new(); len]
}

/// Check the previous-winner context a grader is built with.
///
/// Stake records carry no winner list, so for them the context is only kept
/// as the fallback short hashes: empty, or one well-formed entry per winner.
pub fn check_context(version: Version, context: &[String]) -> Result<()> {
    let policy = version.policy();
    let ok = match policy.family {
        Family::Oracle => check_winner_list(policy, context).is_ok(),
        Family::Stake => context.is_empty() || verify_winner_format(context, policy.winner_amount),
    };
    if ok {
        Ok(())
    } else {
        Err(GraderError::InvalidPreviousWinners(format!(
            "{} entries are not a valid {} context",
            context.len(),
            version
        )))
    }
}

fn check_prices(policy: &VersionPolicy, prices: &[f64]) -> Result<()> {
    if prices.len() != policy.assets.len() {
        return Err(GraderError::validate(format!(
            "invalid assets: expected {}, got {}",
            policy.assets.len(),
            prices.len()
        )));
    }
    for (i, &price) in prices.iter().enumerate() {
        if price == 0.0 && policy.zero_exempt_index != Some(i) {
            return Err(GraderError::validate(format!(
                "asset {} must be greater than 0",
                policy.assets[i]
            )));
        }
    }
    Ok(())
}

/// Apply every check for `version` and build the accepted record.
///
/// Difficulty is verified separately since it needs the hash context.
pub fn validate_entry(
    version: Version,
    entry: ParsedEntry<'_>,
    height: i32,
    context: &[String],
) -> Result<Submission> {
    let policy = version.policy();
    let content = &entry.content;

    if policy.signature != SignatureRule::None {
        let raw = entry
            .signature
            .ok_or_else(|| GraderError::validate("missing signature"))?;
        DetachedSignature::from_bytes(raw)?.verify(entry.raw_content)?;
    }

    if content.height() != height {
        return Err(GraderError::validate(format!(
            "invalid height: got {}, want {}",
            content.height(),
            height
        )));
    }

    let prices = content.ordered_prices(policy.assets)?;
    check_prices(policy, &prices)?;

    let previous_winners = content.previous_winners();
    if policy.family == Family::Oracle {
        check_winner_list(policy, &previous_winners)?;
        if previous_winners != context {
            return Err(GraderError::validate("incorrect set of previous winners"));
        }
    }

    if policy.check_address {
        validate_address(content.address())
            .map_err(|e| GraderError::validate(format!("coinbase address is invalid: {}", e)))?;
    }

    if policy.check_identity && !IDENTITY.is_match(content.identity()) {
        return Err(GraderError::validate(
            "only alphanumeric characters and commas are allowed in the identity",
        ));
    }

    let delegators = match entry.delegation {
        Some(delegation) => {
            delegators_from_block(delegation.block, delegation.signature, content.address())?
        }
        None => Vec::new(),
    };

    Ok(Submission {
        entry_hash: entry.entry_hash,
        nonce: entry.nonce,
        difficulty: entry.difficulty,
        content_hash: entry.content_hash,
        coinbase: content.address().to_string(),
        identity: content.identity().to_string(),
        height,
        prices,
        previous_winners,
        delegators,
        grade: 0.0,
        position: None,
        payout: 0,
    })
}
