//! # Data Loader Crate
//!
//! This crate loads the movie catalog and its precomputed similarity matrix,
//! and answers read-only questions about them.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, SimilarityMatrix, Catalog)
//! - **parser**: Parse JSON or line-oriented text artifacts
//! - **loader**: Build and validate a Catalog from artifacts
//! - **stats**: Summary statistics over the matrix
//! - **error**: Load and lookup error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_dir(Path::new("data"))?;
//!
//! let index = catalog.resolve_index("Avatar")?;
//! let scores = catalog.row(index);
//! let matches = catalog.search("dark", 10);
//! println!("{} movies, row has {} scores", catalog.size(), scores.len());
//! ```

pub mod error;
pub mod loader;
pub mod parser;
pub mod stats;
pub mod types;

pub use error::{DataLoadError, LookupError, Result};
pub use loader::{MOVIES_FILE, SIMILARITY_FILE};
pub use stats::Statistics;
pub use types::{Catalog, Movie, MovieId, MovieIndex, SimilarityMatrix};
