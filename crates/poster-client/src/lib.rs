//! Poster lookup for recommended movies.
//!
//! This crate resolves a movie title to a displayable poster URL using the
//! TMDB search API. It is a presentation helper, so it never fails: any
//! network error, timeout, bad response or missing poster degrades to
//! `PLACEHOLDER_POSTER_URL`.
//!
//! - `PosterResolver`: the seam the orchestrator depends on
//! - `TmdbPosterClient`: the real HTTP implementation
//! - `PlaceholderResolver`: used when no API key is configured

use async_trait::async_trait;
use thiserror::Error;

pub mod tmdb;

pub use tmdb::{TmdbConfig, TmdbPosterClient};

/// Shown whenever a real poster can't be resolved
pub const PLACEHOLDER_POSTER_URL: &str =
    "https://via.placeholder.com/500x750.png?text=No+Poster+Available";

/// Errors that can occur while talking to the poster API.
///
/// These never escape `PosterResolver::poster_url`; they are only visible
/// through `TmdbPosterClient::try_poster_url` and in logs.
#[derive(Error, Debug)]
pub enum PosterError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Poster API returned status {0}")]
    Status(u16),
}

/// Resolves a title to a poster URL.
///
/// Implementations must not fail: return `PLACEHOLDER_POSTER_URL` instead.
#[async_trait]
pub trait PosterResolver: Send + Sync {
    async fn poster_url(&self, title: &str) -> String;
}

/// Resolver that always answers with the placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderResolver;

#[async_trait]
impl PosterResolver for PlaceholderResolver {
    async fn poster_url(&self, _title: &str) -> String {
        PLACEHOLDER_POSTER_URL.to_string()
    }
}
