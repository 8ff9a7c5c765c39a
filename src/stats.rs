//! Per-asset central values and the banded distance grade.

use crate::submission::Submission;
use crate::version::MeanStrategy;

/// Fraction of values dropped from each tail by the trimmed mean.
pub const TRIM_RATE: f64 = 0.1;

/// Mean of absolute values.
pub fn absolute_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|v| v.abs()).sum();
    sum / values.len() as f64
}

/// Mean after sorting and dropping `floor(len * 0.1) + 1` values from each end.
/// Three or fewer values yield the middle one.
pub fn trimmed_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut data = values.to_vec();
    data.sort_by(|a, b| a.total_cmp(b));

    let len = data.len();
    if len <= 3 {
        return data[len / 2];
    }

    let p = (len as f64 * TRIM_RATE) as usize + 1;
    let kept = &data[p..len - p];
    kept.iter().sum::<f64>() / kept.len() as f64
}

/// Central value of every asset over `window`.
pub fn central_values(window: &[Submission], strategy: MeanStrategy) -> Vec<f64> {
    let Some(first) = window.first() else {
        return Vec::new();
    };
    let mut column = Vec::with_capacity(window.len());
    (0..first.prices.len())
        .map(|asset| {
            column.clear();
            column.extend(window.iter().map(|s| s.prices[asset]));
            match strategy {
                MeanStrategy::Arithmetic => absolute_mean(&column),
                MeanStrategy::Trimmed => trimmed_mean(&column),
            }
        })
        .collect()
}

/// Sum over assets of the fourth power of the relative distance to the central value.
///
/// Distances within `band` count as zero and larger ones are reduced by it.
/// Assets whose central value is not positive are skipped.
pub fn grade(prices: &[f64], central: &[f64], band: f64) -> f64 {
    prices
        .iter()
        .zip(central)
        .filter(|(_, &avg)| avg > 0.0)
        .map(|(&price, &avg)| {
            let mut d = ((price - avg) / avg).abs();
            if band > 0.0 {
                d = if d <= band { 0.0 } else { d - band };
            }
            d * d * d * d
        })
        .sum()
}
