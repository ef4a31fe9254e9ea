//! # News pipeline
//! fetch → persist raw → normalize → classify → persist processed.
//!
//! Outcomes map onto the fixed status vocabulary:
//! - fetch error → `fetch-failure`
//! - nothing survives normalization → `process-failure`
//! - classifier error → `prediction-failure` (fatal to the run)
//! - store write errors are non-fatal and only show up in `save_status`
//!
//! Runs are serialized by an internal lock so each store has one writer.

use std::sync::Arc;

use metrics::{counter, gauge};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::article::{CanonicalArticle, Outcome, Status};
use crate::classifier::{predict_articles, DynClassifier};
use crate::config::NewsConfig;
use crate::error::{StoreError, ValidationError};
use crate::ingest::{build_query_url, redact_url, NewsFetcher};
use crate::normalize::{normalize_with_report, NormalizePolicy};
use crate::store::ArticleStore;

pub struct NewsPipeline {
    news: NewsConfig,
    api_key: Option<String>,
    policy: NormalizePolicy,
    fetcher: Arc<dyn NewsFetcher>,
    classifier: DynClassifier,
    store: ArticleStore,
    run_lock: Mutex<()>,
}

impl NewsPipeline {
    pub fn new(
        news: NewsConfig,
        api_key: Option<String>,
        policy: NormalizePolicy,
        fetcher: Arc<dyn NewsFetcher>,
        classifier: DynClassifier,
        store: ArticleStore,
    ) -> Self {
        Self {
            news,
            api_key,
            policy,
            fetcher,
            classifier,
            store,
            run_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn allowed_queries(&self) -> &[String] {
        &self.news.allowed_queries
    }

    /// Full run for a search query. Only an invalid query is an `Err`.
    pub async fn fetch_and_process(
        &self,
        query: &str,
    ) -> Result<Outcome<CanonicalArticle>, ValidationError> {
        let url = build_query_url(query, &self.news, self.api_key.as_deref())?;
        let _guard = self.run_lock.lock().await;

        info!(
            target: "pipeline",
            query,
            fetcher = self.fetcher.name(),
            url = %redact_url(&url, self.api_key.as_deref()),
            "fetching news"
        );
        let raw = match self.fetcher.fetch_articles(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(target: "pipeline", error = %e, "failed to fetch news");
                return Ok(Outcome::failure(Status::FetchFailure));
            }
        };
        info!(target: "pipeline", fetched = raw.len(), "fetched articles");

        if let Err(e) = self.store.save_raw(&raw) {
            warn!(target: "pipeline", error = %e, "could not persist raw articles");
        }

        // nothing upstream is still a successful fetch; the processed table is left as is
        if raw.is_empty() {
            info!(target: "pipeline", query, "fetch returned no articles");
            return Ok(Outcome::success(Status::FetchSuccess, Vec::new()));
        }

        Ok(self.process(&raw).await)
    }

    /// Re-runs normalize → classify → persist over the raw store.
    pub async fn reprocess_raw(&self) -> Outcome<CanonicalArticle> {
        let _guard = self.run_lock.lock().await;
        let raw = match self.store.load_raw() {
            Ok(raw) => raw,
            Err(StoreError::Missing(_)) => return Outcome::failure(Status::ProcessFailure),
            Err(e) => {
                warn!(target: "pipeline", error = %e, "could not load raw articles");
                return Outcome::failure(Status::ProcessFailure);
            }
        };
        self.process(&raw).await
    }

    async fn process(&self, raw: &[serde_json::Value]) -> Outcome<CanonicalArticle> {
        let report = normalize_with_report(raw, &self.policy);
        if report.articles.is_empty() {
            warn!(
                target: "pipeline",
                dropped = report.dropped.len(),
                "no valid articles found after processing"
            );
            return Outcome::failure(Status::ProcessFailure);
        }

        let classified = match predict_articles(self.classifier.as_ref(), &report.articles).await {
            Ok(a) => a,
            Err(e) => {
                warn!(target: "pipeline", error = %e, "sentiment prediction failed");
                return Outcome::failure(Status::PredictionFailure);
            }
        };
        info!(target: "pipeline", articles = classified.len(), "sentiment prediction completed");

        let save_status = match self.store.save_processed(&classified) {
            Ok(_) => Status::ProcessSuccess,
            Err(e) => {
                warn!(target: "pipeline", error = %e, "could not persist processed articles");
                Status::ProcessFailure
            }
        };

        counter!("pipeline_runs_total").increment(1);
        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        Outcome::success(Status::ProcessSuccess, classified).with_save_status(save_status)
    }
}
