//! Summary statistics over the similarity matrix.

use crate::types::Catalog;
use rayon::prelude::*;
use serde::Serialize;

/// Snapshot describing the loaded catalog and matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub total_movies: usize,
    pub matrix_shape: (usize, usize),
    /// Mean over every non-NaN entry, diagonal included
    pub avg_similarity: f32,
    pub max_similarity: f32,
    /// Smallest strictly positive entry; `None` if no entry is positive
    pub min_positive_similarity: Option<f32>,
}

/// Running totals for one slice of the matrix
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    max: f32,
    min_positive: Option<f32>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            max: f32::NEG_INFINITY,
            min_positive: None,
        }
    }

    fn push(mut self, score: f32) -> Self {
        if score.is_nan() {
            return self;
        }
        self.sum += score as f64;
        self.count += 1;
        self.max = self.max.max(score);
        if score > 0.0 {
            self.min_positive = Some(self.min_positive.map_or(score, |m| m.min(score)));
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            count: self.count + other.count,
            max: self.max.max(other.max),
            min_positive: match (self.min_positive, other.min_positive) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

impl Catalog {
    /// Compute summary statistics over the whole matrix.
    ///
    /// NaN entries are skipped. If every entry is NaN the mean and max are NaN.
    pub fn statistics(&self) -> Statistics {
        let dim = self.matrix.dim();

        let totals = self
            .matrix
            .scores()
            .par_chunks(dim.max(1))
            .map(|row| row.iter().fold(Accumulator::new(), |acc, &s| acc.push(s)))
            .reduce(Accumulator::new, Accumulator::merge);

        let (avg_similarity, max_similarity) = if totals.count > 0 {
            ((totals.sum / totals.count as f64) as f32, totals.max)
        } else {
            (f32::NAN, f32::NAN)
        };

        Statistics {
            total_movies: self.size(),
            matrix_shape: self.matrix.shape(),
            avg_similarity,
            max_similarity,
            min_positive_similarity: totals.min_positive,
        }
    }
}
