//! Weighted histogram construction
//!
//! Turns a list of `(score, weight)` pairs into chart-ready bins: trim the
//! extremes, pick an integer bin domain, spread each pair's weight across the
//! two adjacent bins by linear interpolation, and normalize to the tallest
//! bin.

use super::ChartData;

/// Trimming kicks in above this many scored pairs
pub const TRIM_THRESHOLD: usize = 28;

/// Share of the trim quota dropped from the low end; the full quota comes off
/// the high end, where outliers (walked-away-from-the-timer solves) live.
const LOW_TRIM_RATIO: f64 = 0.7;

/// Domain padding: the lowest bin starts below the minimum score and the
/// highest reaches 10% past the maximum.
const DOMAIN_FLOOR: f64 = 0.9;
const DOMAIN_HEADROOM: f64 = 1.1;

/// Rough number of bins to aim for; the integer step size makes it inexact.
const TARGET_BINS: f64 = 12.0;

/// One score with the weight its user's solve count assigned it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub score: f64,
    pub weight: f64,
}

/// Build the normalized histogram for a set of scored pairs.
///
/// Fewer than 2 pairs is not enough to bin; the result is explicitly empty.
pub fn chart(mut scored: Vec<Scored>) -> ChartData {
    if scored.len() < 2 {
        return ChartData {
            labels: Vec::new(),
            data: Vec::new(),
        };
    }

    // Stable: equal scores keep their original order.
    scored.sort_by(|a, b| a.score.total_cmp(&b.score));
    let scored = trim_outliers(scored);

    let (start, end, step) = domain(
        scored[0].score,
        scored[scored.len() - 1].score,
    );
    let labels = bin_labels(start, end, step);
    let data = fill_bins(&scored, start, step, labels.len());

    ChartData {
        labels,
        data: normalize(data),
    }
}

/// Drop a proportional slice from both ends of a sorted score list.
///
/// With `lim = ceil(n / threshold)`, the low end loses `floor(0.7 * lim)` and
/// the high end loses `lim`. At or below the threshold nothing is trimmed.
pub fn trim_outliers(scored: Vec<Scored>) -> Vec<Scored> {
    let n = scored.len();
    if n <= TRIM_THRESHOLD {
        return scored;
    }

    let lim = n.div_ceil(TRIM_THRESHOLD);
    let low = (lim as f64 * LOW_TRIM_RATIO) as usize;
    scored[low..n - lim].to_vec()
}

/// Integer bin domain: padded start/end and a step targeting ~12 bins, never
/// below 1
fn domain(min: f64, max: f64) -> (i64, i64, i64) {
    let start = (min * DOMAIN_FLOOR).floor() as i64;
    let end = (max * DOMAIN_HEADROOM).ceil() as i64;
    let step = (0.5 + (end - start) as f64 / TARGET_BINS).round() as i64;
    (start, end, step.max(1))
}

/// Ascending bin left-edges from `start` through `end` inclusive
fn bin_labels(start: i64, end: i64, step: i64) -> Vec<i64> {
    let count = ((end - start + step) as f64 / step as f64).ceil() as i64;
    (0..count).map(|i| start + i * step).collect()
}

/// Split each pair's weight between its two adjacent bins in proportion to
/// its fractional bin position
fn fill_bins(scored: &[Scored], start: i64, step: i64, bins: usize) -> Vec<f64> {
    let mut data = vec![0.0; bins];
    if bins == 0 {
        return data;
    }

    for s in scored {
        let x = ((s.score - start as f64) / step as f64).min((bins - 1) as f64);
        let frac = x - x.floor();
        let idx = x.floor() as usize;
        data[idx] += (1.0 - frac) * s.weight;
        data[idx + frac.ceil() as usize] += frac * s.weight;
    }

    data
}

/// Scale bins into `[0, 1]` against the tallest; all-zero input stays zero
fn normalize(mut data: Vec<f64>) -> Vec<f64> {
    let max = data.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for value in &mut data {
            *value /= max;
        }
    }
    data
}
