//! Ranking of one similarity row.
//!
//! ## Algorithm
//! 1. Pair every score with its column index
//! 2. Stable sort, highest score first
//! 3. Drop the query's own column (wherever it landed)
//! 4. Keep the first `k`
//!
//! Because the sort is stable and the input is in index order, equal scores
//! keep ascending index order. NaN scores rank below every real score.

use data_loader::MovieIndex;
use std::cmp::Ordering;

/// Ordering for scores: descending, NaN last.
pub fn compare_scores(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// Top `k` `(index, score)` pairs of `row`, excluding column `exclude`.
pub fn rank_row(row: &[f32], exclude: MovieIndex, k: usize) -> Vec<(MovieIndex, f32)> {
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(MovieIndex, f32)> = row.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| compare_scores(a.1, b.1));

    ranked
        .into_iter()
        .filter(|&(index, _)| index != exclude)
        .take(k)
        .collect()
}
