//! Error types for the data-loader crate.
//!
//! Two families of failure live here:
//! - `DataLoadError`: the catalog or similarity artifact could not be loaded.
//!   These are fatal at startup; nothing can be served without both artifacts.
//! - `LookupError`: a query named a movie that is not in the catalog.
//!   These are expected at runtime and are recovered at the query boundary.

use thiserror::Error;

/// Errors that can occur while loading the catalog and similarity artifacts
///
/// Every variant that originates from a file carries the path (or file name)
/// so the diagnostic names the artifact that failed.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Artifact file could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a text artifact couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// JSON artifact was malformed
    #[error("Malformed JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog artifact contained no movies
    #[error("Catalog contains no movies")]
    EmptyCatalog,

    /// A matrix row doesn't have one score per movie
    #[error("Similarity row {row} has {found} scores, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Matrix dimension doesn't match the number of catalog entries
    #[error("Similarity matrix has {rows} rows but the catalog has {movies} movies")]
    DimensionMismatch { movies: usize, rows: usize },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

/// Errors raised by catalog lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Exact title match failed
    #[error("Movie '{title}' not found in the catalog")]
    MovieNotFound { title: String },
}
