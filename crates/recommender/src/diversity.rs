//! Diversity of a set of recommendations.
//!
//! Diversity here is the average similarity between every pair of titles in
//! the list: the lower the number, the more varied the list.

use data_loader::{Catalog, LookupError};

/// Mean of `score(a, b)` over all unordered pairs of `titles`.
///
/// Pairs are taken by list position (`i < j`), reading `matrix[i][j]`.
/// Fewer than two titles means no pairs, which scores `0.0`.
/// Any unknown title fails the whole computation.
pub fn diversity_score<S: AsRef<str>>(catalog: &Catalog, titles: &[S]) -> Result<f32, LookupError> {
    let indices = titles
        .iter()
        .map(|title| catalog.resolve_index(title.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut total = 0.0f64;
    let mut pairs = 0usize;
    for (i, &a) in indices.iter().enumerate() {
        for &b in &indices[i + 1..] {
            total += catalog.score(a, b) as f64;
            pairs += 1;
        }
    }

    if pairs == 0 {
        return Ok(0.0);
    }
    Ok((total / pairs as f64) as f32)
}
