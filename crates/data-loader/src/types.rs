//! Core domain types for the movie catalog.
//!
//! The catalog is an ordered list of movies plus a dense, row-major
//! similarity matrix whose row `i` holds the scores of movie `i` against
//! every movie in the catalog (itself included).

use crate::error::LookupError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Upstream (TMDB) identifier for a movie, when the artifact carries one
pub type MovieId = u32;

/// Position of a movie in the catalog; also its row/column in the matrix
pub type MovieIndex = usize;

// =============================================================================
// Movie
// =============================================================================

/// A single catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_id: Option<MovieId>,
    pub title: String,
}

impl Movie {
    /// A movie known only by its title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            movie_id: None,
            title: title.into(),
        }
    }

    pub fn with_id(movie_id: MovieId, title: impl Into<String>) -> Self {
        Self {
            movie_id: Some(movie_id),
            title: title.into(),
        }
    }
}

// =============================================================================
// SimilarityMatrix
// =============================================================================

/// Square matrix of precomputed similarity scores.
///
/// Stored as one contiguous `Vec<f32>` in row-major order so a row is a
/// plain slice. Symmetry is not checked; the producer is trusted for that.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build a matrix from rows, checking that it is square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> crate::Result<Self> {
        let dim = rows.len();
        let mut scores = Vec::with_capacity(dim * dim);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dim {
                return Err(crate::DataLoadError::RaggedRow {
                    row,
                    expected: dim,
                    found: values.len(),
                });
            }
            scores.extend(values);
        }

        Ok(Self { dim, scores })
    }

    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.dim, self.dim)
    }

    /// Scores of movie `index` against every catalog entry
    pub fn row(&self, index: MovieIndex) -> &[f32] {
        let start = index * self.dim;
        &self.scores[start..start + self.dim]
    }

    pub fn get(&self, i: MovieIndex, j: MovieIndex) -> f32 {
        self.scores[i * self.dim + j]
    }

    /// All scores, row-major
    pub(crate) fn scores(&self) -> &[f32] {
        &self.scores
    }
}

// =============================================================================
// Catalog - The Read-Only Store
// =============================================================================

/// Movie records and their similarity matrix.
///
/// Built once at startup (see `Catalog::load_from_files`) and never mutated
/// afterwards; share it behind an `Arc` and hand it to whoever needs it.
#[derive(Debug)]
pub struct Catalog {
    pub(crate) movies: Vec<Movie>,
    /// Title -> index of its first occurrence
    pub(crate) title_index: HashMap<String, MovieIndex>,
    pub(crate) matrix: SimilarityMatrix,
}

impl Catalog {
    /// Resolve an exact (case-sensitive) title to its catalog index.
    ///
    /// If several movies share the title, the first one in catalog order wins.
    pub fn resolve_index(&self, title: &str) -> Result<MovieIndex, LookupError> {
        self.title_index
            .get(title)
            .copied()
            .ok_or_else(|| LookupError::MovieNotFound {
                title: title.to_string(),
            })
    }

    /// Title of the movie at `index`.
    ///
    /// Indices come from this catalog, so an out-of-range index is a bug and panics.
    pub fn title_at(&self, index: MovieIndex) -> &str {
        &self.movies[index].title
    }

    pub fn movie_at(&self, index: MovieIndex) -> &Movie {
        &self.movies[index]
    }

    pub fn contains(&self, title: &str) -> bool {
        self.title_index.contains_key(title)
    }

    /// Number of catalog entries
    pub fn size(&self) -> usize {
        self.movies.len()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Similarity scores of the movie at `index` against the whole catalog
    pub fn row(&self, index: MovieIndex) -> &[f32] {
        self.matrix.row(index)
    }

    pub fn score(&self, i: MovieIndex, j: MovieIndex) -> f32 {
        self.matrix.get(i, j)
    }

    /// Case-insensitive substring search over titles.
    ///
    /// Returns at most `limit` titles in catalog order. An empty query
    /// matches every title.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        let query_lower = query.to_lowercase();
        self.movies
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&query_lower))
            .take(limit)
            .map(|movie| movie.title.as_str())
            .collect()
    }

    /// Draw up to `n` distinct titles uniformly at random.
    pub fn sample_titles<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&str> {
        let amount = n.min(self.size());
        rand::seq::index::sample(rng, self.size(), amount)
            .into_iter()
            .map(|index| self.title_at(index))
            .collect()
    }
}
