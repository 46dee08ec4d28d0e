//! CineMatch HTTP server.
//!
//! Loads the catalog once at startup and serves queries until shut down.
//! A catalog that fails to load is fatal: the process exits before binding.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{AppState, Config, RecommendationService, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting CineMatch server");
    let config = Config::from_env()?;

    let start_time = Instant::now();
    let catalog = config.load_catalog()?;
    info!(
        "Catalog ready: {} movies in {:.2?}",
        catalog.size(),
        start_time.elapsed()
    );

    let service = RecommendationService::new(catalog, config.poster_resolver()?)
        .with_max_concurrent_posters(config.poster_concurrency);
    let app = create_router(AppState::new(service, config.top_n_recommendations));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
