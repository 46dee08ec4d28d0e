//! HTTP query surface.
//!
//! Every route is a thin adapter over `RecommendationService`; lookup
//! failures are mapped to status codes by `ApiError`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use data_loader::{LookupError, Statistics};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::orchestrator::{MovieRecommendation, RecommendationService};

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_RANDOM_COUNT: usize = 5;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    /// Used when `/recommend` is called without `k`
    pub default_k: usize,
}

impl AppState {
    pub fn new(service: RecommendationService, default_k: usize) -> Self {
        Self {
            service: Arc::new(service),
            default_k,
        }
    }
}

/// Errors surfaced to HTTP clients as `{"error": message}`
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<LookupError>() {
            Some(lookup) => ApiError::NotFound(lookup.to_string()),
            None => ApiError::Internal(format!("{:#}", err)),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommend", get(recommend))
        .route("/search", get(search))
        .route("/stats", get(stats))
        .route("/random", get(random))
        .route("/diversity", post(diversity))
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    title: String,
    k: Option<usize>,
    #[serde(default)]
    posters: bool,
}

async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> ApiResult<Json<Vec<MovieRecommendation>>> {
    if params.title.trim().is_empty() {
        return Err(ApiError::InvalidInput("title must not be empty".to_string()));
    }
    let k = params.k.unwrap_or(state.default_k);

    let recommendations = if params.posters {
        state.service.recommend_with_posters(&params.title, k).await?
    } else {
        state.service.recommend(&params.title, k)?
    };
    Ok(Json(recommendations))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<String>> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Json(state.service.search(&params.q, limit))
}

async fn stats(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.service.statistics())
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    n: Option<usize>,
}

async fn random(
    State(state): State<AppState>,
    Query(params): Query<RandomQuery>,
) -> Json<Vec<String>> {
    let n = params.n.unwrap_or(DEFAULT_RANDOM_COUNT);
    Json(state.service.random_titles(n))
}

#[derive(Debug, Deserialize)]
pub struct DiversityRequest {
    titles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DiversityResponse {
    diversity: f32,
}

async fn diversity(
    State(state): State<AppState>,
    Json(body): Json<DiversityRequest>,
) -> ApiResult<Json<DiversityResponse>> {
    let diversity = state.service.diversity(&body.titles)?;
    Ok(Json(DiversityResponse { diversity }))
}
