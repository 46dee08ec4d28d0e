//! Catalog construction from artifacts.
//!
//! Loading happens once per process:
//! 1. Parse the catalog and similarity artifacts (in parallel)
//! 2. Check the matrix is square and matches the catalog size
//! 3. Build the title lookup table (first occurrence wins)

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::{Catalog, Movie, MovieIndex, SimilarityMatrix};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Default artifact names inside a data directory
pub const MOVIES_FILE: &str = "movies.dat";
pub const SIMILARITY_FILE: &str = "similarity.dat";

impl Catalog {
    /// Load `movies.dat` and `similarity.dat` from a directory
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        Self::load_from_files(&data_dir.join(MOVIES_FILE), &data_dir.join(SIMILARITY_FILE))
    }

    /// Load the catalog and its similarity matrix.
    ///
    /// Any missing, malformed or dimensionally inconsistent artifact is an
    /// error; the caller should not serve queries without a catalog.
    pub fn load_from_files(movies_path: &Path, similarity_path: &Path) -> Result<Self> {
        info!(
            movies = %movies_path.display(),
            similarity = %similarity_path.display(),
            "Loading catalog artifacts"
        );
        let start = Instant::now();

        // The matrix is by far the larger file, so parse both at once
        let (movies, rows) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_similarity(similarity_path),
        );
        let movies = movies?;
        let matrix = SimilarityMatrix::from_rows(rows?).map_err(|e| match e {
            DataLoadError::RaggedRow { row, .. } => DataLoadError::ParseError {
                file: similarity_path.display().to_string(),
                line: row + 1,
                reason: e.to_string(),
            },
            other => other,
        })?;

        let catalog = Self::from_parts(movies, matrix)?;
        info!(
            "Loaded {} movies and a {}x{} similarity matrix in {:.2?}",
            catalog.size(),
            catalog.matrix.dim(),
            catalog.matrix.dim(),
            start.elapsed()
        );
        Ok(catalog)
    }

    /// Assemble a catalog from already-parsed parts.
    pub fn from_parts(movies: Vec<Movie>, matrix: SimilarityMatrix) -> Result<Self> {
        if movies.is_empty() {
            return Err(DataLoadError::EmptyCatalog);
        }
        if matrix.dim() != movies.len() {
            return Err(DataLoadError::DimensionMismatch {
                movies: movies.len(),
                rows: matrix.dim(),
            });
        }

        let title_index = build_title_index(&movies);
        Ok(Self {
            movies,
            title_index,
            matrix,
        })
    }
}

/// Map each title to the index of its first occurrence
fn build_title_index(movies: &[Movie]) -> HashMap<String, MovieIndex> {
    let mut title_index = HashMap::with_capacity(movies.len());
    let mut duplicates = 0usize;

    for (index, movie) in movies.iter().enumerate() {
        match title_index.entry(movie.title.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    }

    if duplicates > 0 {
        warn!(
            duplicates,
            "Catalog contains duplicate titles; lookups resolve to the first occurrence"
        );
    }
    title_index
}
