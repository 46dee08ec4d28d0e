//! # Recommendation Orchestrator
//!
//! This module coordinates a recommendation request end to end:
//! 1. Resolve the title and rank its similarity row (recommender crate)
//! 2. Optionally resolve a poster for every result, concurrently
//! 3. Return results in ranked order, whatever order the posters arrive in
//!
//! Poster lookups can't fail the request: a failed or panicked lookup
//! becomes the placeholder image.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use data_loader::{Catalog, Statistics};
use poster_client::{PLACEHOLDER_POSTER_URL, PosterResolver};
use recommender::{Recommendation, Recommender};

/// Final recommendation returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    pub title: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl From<Recommendation> for MovieRecommendation {
    fn from(rec: Recommendation) -> Self {
        Self {
            title: rec.title,
            score: rec.score,
            poster_url: None,
        }
    }
}

/// Poster lookups allowed in flight per request unless configured otherwise
pub const DEFAULT_MAX_CONCURRENT_POSTERS: usize = 8;

/// Front door for every query the binaries serve
#[derive(Clone)]
pub struct RecommendationService {
    recommender: Recommender,
    poster_resolver: Arc<dyn PosterResolver>,
    max_concurrent_posters: usize,
}

impl RecommendationService {
    /// # Arguments
    /// * `catalog` - Shared, already-loaded catalog
    /// * `poster_resolver` - Where poster URLs come from (TMDB or placeholder)
    pub fn new(catalog: Arc<Catalog>, poster_resolver: Arc<dyn PosterResolver>) -> Self {
        Self {
            recommender: Recommender::new(catalog),
            poster_resolver,
            max_concurrent_posters: DEFAULT_MAX_CONCURRENT_POSTERS,
        }
    }

    /// Cap on concurrent poster lookups per request (at least one)
    pub fn with_max_concurrent_posters(mut self, limit: usize) -> Self {
        self.max_concurrent_posters = limit.max(1);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        self.recommender.catalog()
    }

    /// Ranked recommendations without posters
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<MovieRecommendation>> {
        let start_time = Instant::now();
        let recommendations: Vec<MovieRecommendation> = self
            .recommender
            .recommend(title, k)?
            .into_iter()
            .map(MovieRecommendation::from)
            .collect();

        info!(
            "Recommended {} movies for '{}' in {:.2?}",
            recommendations.len(),
            title,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Ranked recommendations, each with a poster URL
    pub async fn recommend_with_posters(
        &self,
        title: &str,
        k: usize,
    ) -> Result<Vec<MovieRecommendation>> {
        let start_time = Instant::now();
        let mut recommendations = self.recommend(title, k)?;

        let titles: Vec<String> = recommendations.iter().map(|r| r.title.clone()).collect();
        let posters = self.fetch_posters(titles).await;

        for (rec, poster) in recommendations.iter_mut().zip(posters) {
            rec.poster_url = Some(poster);
        }

        info!(
            "Resolved {} posters for '{}', total time {:.2?}",
            recommendations.len(),
            title,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Resolve posters concurrently, at most `max_concurrent_posters` at a time.
    ///
    /// Each result is written back by position, so output order matches
    /// `titles`. Dropping the returned future aborts lookups still in flight.
    async fn fetch_posters(&self, titles: Vec<String>) -> Vec<String> {
        let mut posters = vec![PLACEHOLDER_POSTER_URL.to_string(); titles.len()];
        let permits = Arc::new(Semaphore::new(self.max_concurrent_posters));
        let mut lookups = JoinSet::new();

        for (position, title) in titles.into_iter().enumerate() {
            let resolver = Arc::clone(&self.poster_resolver);
            let permits = Arc::clone(&permits);
            lookups.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                Some((position, resolver.poster_url(&title).await))
            });
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok(Some((position, poster))) => posters[position] = poster,
                Ok(None) => warn!("Poster permits closed, using placeholder"),
                Err(e) => warn!(error = %e, "Poster task failed, using placeholder"),
            }
        }
        posters
    }

    /// Case-insensitive title search
    pub fn search(&self, query: &str, limit: usize) -> Vec<String> {
        self.catalog()
            .search(query, limit)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        self.catalog().statistics()
    }

    /// Up to `n` distinct random titles
    pub fn random_titles(&self, n: usize) -> Vec<String> {
        self.catalog()
            .sample_titles(n, &mut rand::rng())
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Mean pairwise similarity of `titles`
    pub fn diversity(&self, titles: &[String]) -> Result<f32> {
        Ok(self.recommender.diversity_score(titles)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use data_loader::{LookupError, Movie, SimilarityMatrix};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// Four movies; "Avatar" ranks Inception > Interstellar > Toy Story
    fn build_test_catalog() -> Arc<Catalog> {
        let movies = vec![
            Movie::with_id(19995, "Avatar"),
            Movie::with_id(27205, "Inception"),
            Movie::with_id(157336, "Interstellar"),
            Movie::with_id(862, "Toy Story"),
        ];
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.6, 0.4, 0.1],
            vec![0.6, 1.0, 0.8, 0.05],
            vec![0.4, 0.8, 1.0, 0.0],
            vec![0.1, 0.05, 0.0, 1.0],
        ])
        .unwrap();
        Arc::new(Catalog::from_parts(movies, matrix).unwrap())
    }

    /// Resolver whose latency per title is configurable, to scramble completion order
    struct DelayedResolver {
        delays_ms: HashMap<String, u64>,
        calls: AtomicUsize,
    }

    impl DelayedResolver {
        fn new(delays: &[(&str, u64)]) -> Self {
            Self {
                delays_ms: delays.iter().map(|(t, d)| (t.to_string(), *d)).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PosterResolver for DelayedResolver {
        async fn poster_url(&self, title: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delays_ms.get(title).copied().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            format!("https://posters.test/{}.jpg", title.replace(' ', "_"))
        }
    }

    /// Resolver that panics for one title
    struct PanickyResolver;

    #[async_trait]
    impl PosterResolver for PanickyResolver {
        async fn poster_url(&self, title: &str) -> String {
            if title == "Inception" {
                panic!("poster backend exploded");
            }
            format!("https://posters.test/{}.jpg", title)
        }
    }

    /// `n` movies named `M0..M{n-1}`; closer indices are more similar
    fn build_large_catalog(n: usize) -> Arc<Catalog> {
        let movies = (0..n).map(|i| Movie::new(format!("M{}", i))).collect();
        let rows: Vec<Vec<f32>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| 1.0 - (i.abs_diff(j) as f32) / (n as f32))
                    .collect()
            })
            .collect();
        let matrix = SimilarityMatrix::from_rows(rows).unwrap();
        Arc::new(Catalog::from_parts(movies, matrix).unwrap())
    }

    /// Counts lookups in flight; the count drops even when a lookup is aborted
    struct PeakTrackingResolver {
        delay: Duration,
        in_flight: Arc<AtomicUsize>,
        peak: AtomicUsize,
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    impl PeakTrackingResolver {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: AtomicUsize::new(0),
                started: AtomicUsize::new(0),
                finished: AtomicUsize::new(0),
            }
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    struct InFlightGuard(Arc<AtomicUsize>);

    impl Drop for InFlightGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PosterResolver for PeakTrackingResolver {
        async fn poster_url(&self, title: &str) -> String {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            let _guard = InFlightGuard(Arc::clone(&self.in_flight));
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            format!("https://posters.test/{}.jpg", title)
        }
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[test]
    fn test_recommend_without_posters() {
        let resolver = Arc::new(DelayedResolver::new(&[]));
        let service = RecommendationService::new(build_test_catalog(), resolver.clone());

        let recs = service.recommend("Avatar", 2).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "Inception");
        assert_eq!(recs[0].score, 0.6);
        assert!(recs.iter().all(|r| r.poster_url.is_none()));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0, "No poster lookups expected");
    }

    #[test]
    fn test_recommend_unknown_title_is_lookup_error() {
        let service = RecommendationService::new(build_test_catalog(), Arc::new(DelayedResolver::new(&[])));

        let err = service.recommend("Unknown Movie", 5).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LookupError>(),
            Some(LookupError::MovieNotFound { title }) if title == "Unknown Movie"
        ));
    }

    #[tokio::test]
    async fn test_posters_keep_ranked_order() {
        // The top result is the slowest to resolve
        let resolver = Arc::new(DelayedResolver::new(&[
            ("Inception", 120),
            ("Interstellar", 60),
            ("Toy Story", 0),
        ]));
        let service = RecommendationService::new(build_test_catalog(), resolver.clone());

        let recs = service.recommend_with_posters("Avatar", 3).await.unwrap();

        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Inception", "Interstellar", "Toy Story"]);
        assert_eq!(
            recs[0].poster_url.as_deref(),
            Some("https://posters.test/Inception.jpg")
        );
        assert_eq!(
            recs[2].poster_url.as_deref(),
            Some("https://posters.test/Toy_Story.jpg")
        );
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_posters_fetched_concurrently() {
        let resolver = Arc::new(PeakTrackingResolver::new(Duration::from_millis(50)));
        let service = RecommendationService::new(build_test_catalog(), resolver.clone());

        service.recommend_with_posters("Avatar", 3).await.unwrap();
        assert_eq!(resolver.peak(), 3, "All three lookups should overlap");
    }

    #[tokio::test]
    async fn test_poster_lookups_are_capped() {
        let resolver = Arc::new(PeakTrackingResolver::new(Duration::from_millis(2)));
        let service = RecommendationService::new(build_large_catalog(500), resolver.clone())
            .with_max_concurrent_posters(4);

        let recs = service.recommend_with_posters("M0", usize::MAX).await.unwrap();

        assert_eq!(recs.len(), 499);
        assert_eq!(resolver.peak(), 4);
        for (i, rec) in recs.iter().enumerate() {
            assert_eq!(rec.title, format!("M{}", i + 1));
            assert_eq!(
                rec.poster_url.as_deref(),
                Some(format!("https://posters.test/M{}.jpg", i + 1).as_str())
            );
        }
    }

    #[tokio::test]
    async fn test_default_cap_applies() {
        let resolver = Arc::new(PeakTrackingResolver::new(Duration::from_millis(2)));
        let service = RecommendationService::new(build_large_catalog(50), resolver.clone());

        service.recommend_with_posters("M0", 49).await.unwrap();
        assert_eq!(resolver.peak(), DEFAULT_MAX_CONCURRENT_POSTERS);
    }

    #[tokio::test]
    async fn test_zero_cap_still_makes_progress() {
        let resolver = Arc::new(PeakTrackingResolver::new(Duration::from_millis(1)));
        let service = RecommendationService::new(build_test_catalog(), resolver.clone())
            .with_max_concurrent_posters(0);

        let recs = service.recommend_with_posters("Avatar", 3).await.unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(resolver.peak(), 1);
    }

    #[tokio::test]
    async fn test_dropped_request_aborts_lookups() {
        let resolver = Arc::new(PeakTrackingResolver::new(Duration::from_secs(30)));
        let service = RecommendationService::new(build_test_catalog(), resolver.clone())
            .with_max_concurrent_posters(2);

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            service.recommend_with_posters("Avatar", 3),
        )
        .await;
        assert!(outcome.is_err(), "Lookups should still be pending");

        // Aborted tasks are dropped on their next scheduling
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(resolver.started.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_lookup_degrades_to_placeholder() {
        let service = RecommendationService::new(build_test_catalog(), Arc::new(PanickyResolver));

        let recs = service.recommend_with_posters("Avatar", 2).await.unwrap();
        assert_eq!(recs[0].title, "Inception");
        assert_eq!(recs[0].poster_url.as_deref(), Some(PLACEHOLDER_POSTER_URL));
        assert_eq!(
            recs[1].poster_url.as_deref(),
            Some("https://posters.test/Interstellar.jpg")
        );
    }

    #[tokio::test]
    async fn test_zero_k_makes_no_lookups() {
        let resolver = Arc::new(DelayedResolver::new(&[]));
        let service = RecommendationService::new(build_test_catalog(), resolver.clone());

        let recs = service.recommend_with_posters("Avatar", 0).await.unwrap();
        assert!(recs.is_empty());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pass_throughs() {
        let service = RecommendationService::new(build_test_catalog(), Arc::new(DelayedResolver::new(&[])));

        assert_eq!(service.search("IN", 10), vec!["Inception", "Interstellar"]);
        assert_eq!(service.statistics().total_movies, 4);
        assert_eq!(service.random_titles(10).len(), 4);
        assert_eq!(
            service
                .diversity(&["Inception".to_string(), "Interstellar".to_string()])
                .unwrap(),
            0.8
        );
        assert!(service.diversity(&["Nope".to_string()]).is_err());
    }
}
