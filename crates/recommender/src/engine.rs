//! Recommendation engine over a loaded catalog.

use crate::diversity;
use crate::ranking::rank_row;
use data_loader::{Catalog, LookupError, MovieIndex};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Catalog index of the recommended movie
    pub index: MovieIndex,
    pub title: String,
    pub score: f32,
}

/// Finds the movies most similar to a given title.
///
/// Holds a shared handle to the catalog (read-only, so no Mutex needed).
/// Every call is a pure function of the catalog and its arguments.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Arc<Catalog>,
}

impl Recommender {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Top `k` movies most similar to `title`, best first.
    ///
    /// The query movie itself is never returned. `k == 0` gives an empty
    /// list; a `k` beyond the catalog size returns every other movie.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Recommendation>, LookupError> {
        let query_index = self.catalog.resolve_index(title)?;
        let ranked = rank_row(self.catalog.row(query_index), query_index, k);
        debug!(query_index, results = ranked.len(), "Ranked similarity row");

        Ok(ranked
            .into_iter()
            .map(|(index, score)| Recommendation {
                index,
                title: self.catalog.title_at(index).to_string(),
                score,
            })
            .collect())
    }

    /// Same ranking as `recommend`, titles only
    pub fn recommend_titles(&self, title: &str, k: usize) -> Result<Vec<&str>, LookupError> {
        let query_index = self.catalog.resolve_index(title)?;
        Ok(rank_row(self.catalog.row(query_index), query_index, k)
            .into_iter()
            .map(|(index, _)| self.catalog.title_at(index))
            .collect())
    }

    /// Mean pairwise similarity between `titles` (see `diversity::diversity_score`)
    pub fn diversity_score<S: AsRef<str>>(&self, titles: &[S]) -> Result<f32, LookupError> {
        diversity::diversity_score(&self.catalog, titles)
    }
}
