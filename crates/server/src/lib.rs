//! Server crate for the CineMatch recommender.
//!
//! - **config**: environment-driven settings and the factories built from them
//! - **orchestrator**: `RecommendationService`, ranking plus concurrent poster lookup
//! - **api**: the axum router exposing the service over HTTP

pub mod api;
pub mod config;
pub mod orchestrator;

pub use api::{ApiError, AppState, create_router};
pub use config::Config;
pub use orchestrator::{DEFAULT_MAX_CONCURRENT_POSTERS, MovieRecommendation, RecommendationService};
