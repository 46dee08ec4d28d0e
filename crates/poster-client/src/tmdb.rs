//! TMDB-backed poster resolver.
//!
//! API flow:
//! 1. `GET {api_base}/search/movie?api_key=..&query=<title>`
//! 2. Take the first result's `poster_path`, if any
//! 3. Poster URL is `{image_base}{poster_path}`

use crate::{PosterError, PosterResolver, PLACEHOLDER_POSTER_URL};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the TMDB API
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub api_base: String,
    pub image_base: String,
    /// Whole-request timeout, connect included
    pub timeout: Duration,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_image_base(mut self, image_base: impl Into<String>) -> Self {
        self.image_base = image_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Subset of the `/search/movie` response we read
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    poster_path: Option<String>,
}

/// HTTP client for TMDB poster lookups.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TmdbPosterClient {
    http_client: HttpClient,
    config: TmdbConfig,
}

impl TmdbPosterClient {
    pub fn new(config: TmdbConfig) -> Result<Self, PosterError> {
        let http_client = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Look up the poster for `title`, reporting why it failed.
    ///
    /// `Ok(None)` means the API answered but had no poster for the title.
    pub async fn try_poster_url(&self, title: &str) -> Result<Option<String>, PosterError> {
        let url = format!("{}/search/movie", self.config.api_base);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.config.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PosterError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .next()
            .and_then(|result| result.poster_path)
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", self.config.image_base, path)))
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }
}

#[async_trait]
impl PosterResolver for TmdbPosterClient {
    async fn poster_url(&self, title: &str) -> String {
        match self.try_poster_url(title).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!(title, "No poster found");
                PLACEHOLDER_POSTER_URL.to_string()
            }
            Err(e) => {
                warn!(title, error = %e, "Poster lookup failed, using placeholder");
                PLACEHOLDER_POSTER_URL.to_string()
            }
        }
    }
}
