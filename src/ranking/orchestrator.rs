//! Ranking orchestrator: load the processed table, pick a strategy by name,
//! rank, truncate.

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::article::ScoredArticle;
use crate::error::{StoreError, ValidationError};
use crate::store::ArticleStore;

use super::StrategyRegistry;

pub struct Ranker {
    store: ArticleStore,
    registry: StrategyRegistry,
}

impl Ranker {
    pub fn new(store: ArticleStore, registry: StrategyRegistry) -> Self {
        Self { store, registry }
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Ranks the persisted processed articles with `strategy_name`.
    ///
    /// A missing, empty or unreadable store yields an empty list. `limit` only
    /// applies when positive.
    pub fn rank(
        &self,
        strategy_name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ScoredArticle>, ValidationError> {
        let strategy = self.registry.get(strategy_name)?;

        let articles = match self.store.load_processed() {
            Ok(a) => a,
            Err(StoreError::Missing(path)) => {
                info!(target: "ranking", path = %path.display(), "no processed articles yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!(target: "ranking", error = %e, "could not load processed articles");
                return Ok(Vec::new());
            }
        };
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let t0 = Instant::now();
        let mut ranked = strategy.rank(&articles);
        histogram!("ranking_ms", "strategy" => strategy.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ranking_requests_total", "strategy" => strategy.name()).increment(1);

        if let Some(n) = limit.filter(|&n| n > 0) {
            ranked.truncate(n);
        }
        info!(
            target: "ranking",
            strategy = strategy.name(),
            total = articles.len(),
            returned = ranked.len(),
            "ranked articles"
        );
        Ok(ranked)
    }
}
