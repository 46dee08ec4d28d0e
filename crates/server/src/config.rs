//! Configuration loaded from environment variables (and an optional `.env`).

use anyhow::{Context, Result};
use data_loader::Catalog;
use poster_client::{PlaceholderResolver, PosterResolver, TmdbConfig, TmdbPosterClient};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog artifact (`.json` or `movieId::title` lines)
    #[serde(default = "default_movies_path")]
    pub movies_path: PathBuf,

    /// Similarity matrix artifact (`.json` or one row per line)
    #[serde(default = "default_similarity_path")]
    pub similarity_path: PathBuf,

    /// TMDB API key; posters fall back to the placeholder without one
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,

    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Poster lookups allowed in flight per request
    #[serde(default = "default_poster_concurrency")]
    pub poster_concurrency: usize,

    /// Result count when a query doesn't ask for one
    #[serde(default = "default_top_n")]
    pub top_n_recommendations: usize,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_movies_path() -> PathBuf {
    PathBuf::from("data").join(data_loader::MOVIES_FILE)
}

fn default_similarity_path() -> PathBuf {
    PathBuf::from("data").join(data_loader::SIMILARITY_FILE)
}

fn default_tmdb_base_url() -> String {
    poster_client::tmdb::DEFAULT_API_BASE.to_string()
}

fn default_tmdb_image_base_url() -> String {
    poster_client::tmdb::DEFAULT_IMAGE_BASE.to_string()
}

fn default_poster_timeout_secs() -> u64 {
    5
}

fn default_poster_concurrency() -> usize {
    crate::orchestrator::DEFAULT_MAX_CONCURRENT_POSTERS
}

fn default_top_n() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of `(NAME, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Point both artifact paths at the default file names inside `dir`
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.movies_path = dir.join(data_loader::MOVIES_FILE);
        self.similarity_path = dir.join(data_loader::SIMILARITY_FILE);
        self
    }

    /// Load the catalog named by this configuration
    pub fn load_catalog(&self) -> Result<Arc<Catalog>> {
        let catalog = Catalog::load_from_files(&self.movies_path, &self.similarity_path)
            .with_context(|| {
                format!(
                    "Failed to load catalog from {} and {}",
                    self.movies_path.display(),
                    self.similarity_path.display()
                )
            })?;
        Ok(Arc::new(catalog))
    }

    /// TMDB client when a key is configured, placeholder resolver otherwise
    pub fn poster_resolver(&self) -> Result<Arc<dyn PosterResolver>> {
        match self.tmdb_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                let tmdb = TmdbConfig::new(key)
                    .with_api_base(self.tmdb_base_url.clone())
                    .with_image_base(self.tmdb_image_base_url.clone())
                    .with_timeout(Duration::from_secs(self.poster_timeout_secs));
                let client = TmdbPosterClient::new(tmdb).context("Failed to build TMDB client")?;
                info!(api_base = %self.tmdb_base_url, "Poster lookups enabled");
                Ok(Arc::new(client))
            }
            _ => {
                warn!("TMDB_API_KEY not set; posters will use the placeholder image");
                Ok(Arc::new(PlaceholderResolver))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.movies_path, PathBuf::from("data/movies.dat"));
        assert_eq!(config.similarity_path, PathBuf::from("data/similarity.dat"));
        assert!(config.tmdb_api_key.is_none());
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.poster_timeout_secs, 5);
        assert_eq!(config.poster_concurrency, 8);
        assert_eq!(config.top_n_recommendations, 5);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("MOVIES_PATH", "/srv/movies.json"),
            ("TMDB_API_KEY", "secret"),
            ("TOP_N_RECOMMENDATIONS", "10"),
            ("POSTER_CONCURRENCY", "2"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.movies_path, PathBuf::from("/srv/movies.json"));
        assert_eq!(config.tmdb_api_key.as_deref(), Some("secret"));
        assert_eq!(config.top_n_recommendations, 10);
        assert_eq!(config.poster_concurrency, 2);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = Config::from_vars(vars(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_with_data_dir() {
        let config = Config::from_vars(vars(&[])).unwrap().with_data_dir("/data/tmdb");
        assert_eq!(config.movies_path, PathBuf::from("/data/tmdb/movies.dat"));
        assert_eq!(config.similarity_path, PathBuf::from("/data/tmdb/similarity.dat"));
    }

    #[test]
    fn test_missing_artifacts_name_paths() {
        let config = Config::from_vars(vars(&[])).unwrap().with_data_dir("/nonexistent/dir");
        let err = config.load_catalog().unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/dir/movies.dat"));
    }

    #[tokio::test]
    async fn test_blank_api_key_uses_placeholder() {
        let config = Config::from_vars(vars(&[("TMDB_API_KEY", "  ")])).unwrap();
        let resolver = config.poster_resolver().unwrap();
        assert_eq!(
            resolver.poster_url("Avatar").await,
            poster_client::PLACEHOLDER_POSTER_URL
        );
    }
}
