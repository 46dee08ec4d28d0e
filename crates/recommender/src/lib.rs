//! # Recommender Crate
//!
//! Content-based "more like this" recommendations over a precomputed
//! similarity matrix.
//!
//! ## Components
//!
//! - **ranking**: sort one matrix row with a deterministic tie-break
//! - **engine**: `Recommender`, the title -> top-K entry point
//! - **diversity**: average pairwise similarity of a result list
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use recommender::Recommender;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::load_from_dir(Path::new("data"))?);
//! let recommender = Recommender::new(catalog);
//!
//! for rec in recommender.recommend("Avatar", 5)? {
//!     println!("{} ({:.3})", rec.title, rec.score);
//! }
//! ```

pub mod diversity;
pub mod engine;
pub mod ranking;

pub use diversity::diversity_score;
pub use engine::{Recommendation, Recommender};
pub use ranking::{compare_scores, rank_row};
