// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod article;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod ranking;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{CanonicalArticle, ImpactFeatures, Outcome, ScoredArticle, Status};
pub use crate::pipeline::NewsPipeline;
pub use crate::ranking::{Ranker, RankingStrategy, StrategyRegistry};

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::{AppConfig, Secrets};
use crate::features::{CredibilityTable, FeatureExtractor};
use crate::ingest::{NewsApiClient, NewsFetcher};
use crate::store::ArticleStore;

/// Wires the state from configuration with the given news fetcher.
pub fn build_state(
    cfg: &AppConfig,
    secrets: &Secrets,
    fetcher: Arc<dyn NewsFetcher>,
) -> anyhow::Result<AppState> {
    let store = ArticleStore::new(cfg.storage.raw_path(), cfg.storage.processed_path());

    let credibility = match &cfg.ranking.credibility_path {
        Some(path) => CredibilityTable::load_from_file(path),
        None => CredibilityTable::default_seed(),
    };
    let registry = StrategyRegistry::standard(FeatureExtractor::new(credibility));
    let ranker = Ranker::new(store.clone(), registry);

    let classifier = classifier::build_classifier(
        &cfg.models.sentiment_analysis_model,
        secrets.hf_api_token.clone(),
    )
    .context("building sentiment classifier")?;
    let pipeline = NewsPipeline::new(
        cfg.news.clone(),
        secrets.news_api_key.clone(),
        cfg.pipeline.policy(),
        fetcher,
        classifier,
        store,
    );

    info!(
        strategies = ?ranker.strategy_names(),
        data_dir = %cfg.storage.data_dir.display(),
        "application state ready"
    );
    Ok(AppState::new(cfg, pipeline, ranker))
}

/// Full application router backed by the live NewsAPI client.
pub fn app(
    cfg: &AppConfig,
    secrets: &Secrets,
    metrics: &crate::metrics::Metrics,
) -> anyhow::Result<axum::Router> {
    if secrets.news_api_key.is_none() {
        tracing::warn!("NEWS_API_KEY is not set; fetch-news requests will fail upstream");
    }
    let fetcher = NewsApiClient::new().context("building news api client")?;
    let state = build_state(cfg, secrets, Arc::new(fetcher))?;
    Ok(router(state, metrics))
}
