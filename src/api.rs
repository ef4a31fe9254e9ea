use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::article::{CanonicalArticle, Outcome, ScoredArticle};
use crate::config::{AppConfig, AppSection};
use crate::error::ValidationError;
use crate::metrics::Metrics;
use crate::pipeline::NewsPipeline;
use crate::ranking::Ranker;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<AppSection>,
    pub pipeline: Arc<NewsPipeline>,
    pub ranker: Arc<Ranker>,
    pub default_strategy: String,
    pub default_limit: usize,
}

impl AppState {
    pub fn new(cfg: &AppConfig, pipeline: NewsPipeline, ranker: Ranker) -> Self {
        Self {
            app: Arc::new(cfg.app.clone()),
            pipeline: Arc::new(pipeline),
            ranker: Arc::new(ranker),
            default_strategy: cfg.ranking.default_strategy.clone(),
            default_limit: cfg.ranking.default_limit,
        }
    }
}

pub fn router(state: AppState, metrics: &Metrics) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/", get(welcome))
        .route("/api/v1/data/fetch-news", get(fetch_news))
        .route("/api/v1/data/reprocess", post(reprocess))
        .route("/api/v1/ranking/news", get(rank_news))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(metrics.router())
}

/// Errors that leave the handler as a non-200 response with a `detail` body.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[derive(Serialize)]
struct Welcome {
    #[serde(rename = "App_Name")]
    app_name: String,
    #[serde(rename = "App_Version")]
    app_version: String,
}

async fn welcome(State(state): State<AppState>) -> Json<Welcome> {
    Json(Welcome {
        app_name: state.app.name.clone(),
        app_version: state.app.version.clone(),
    })
}

#[derive(Deserialize)]
struct FetchParams {
    query: String,
}

async fn fetch_news(
    State(state): State<AppState>,
    Query(q): Query<FetchParams>,
) -> Result<Json<Outcome<CanonicalArticle>>, ApiError> {
    info!(target: "api", query = %q.query, "fetch-news request");
    let outcome = state.pipeline.fetch_and_process(&q.query).await.map_err(|e| {
        warn!(target: "api", error = %e, "rejected fetch-news query");
        ApiError::from(e)
    })?;
    Ok(Json(outcome))
}

async fn reprocess(State(state): State<AppState>) -> Json<Outcome<CanonicalArticle>> {
    Json(state.pipeline.reprocess_raw().await)
}

#[derive(Deserialize)]
struct RankParams {
    ranking_type: Option<String>,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct RankResponse {
    message: String,
    count: usize,
    ranking_strategy: String,
    data: Vec<ScoredArticle>,
}

async fn rank_news(
    State(state): State<AppState>,
    Query(q): Query<RankParams>,
) -> Result<Json<RankResponse>, ApiError> {
    let strategy = q.ranking_type.unwrap_or(state.default_strategy);
    let limit = q.limit.unwrap_or(state.default_limit);

    // store read + scoring is blocking work
    let ranker = state.ranker.clone();
    let name = strategy.clone();
    let ranked = tokio::task::spawn_blocking(move || ranker.rank(&name, Some(limit)))
        .await
        .map_err(|e| {
            error!(target: "api", error = %e, "ranking task failed");
            ApiError::Internal(format!("Ranking failed: {e}"))
        })??;

    Ok(Json(RankResponse {
        message: format!("Successfully ranked using {strategy} strategy"),
        count: ranked.len(),
        ranking_strategy: strategy,
        data: ranked,
    }))
}
