// src/ranking/mod.rs
//! Ranking strategies over a batch of canonical articles.
//!
//! A strategy is a pure `&[CanonicalArticle] → Vec<ScoredArticle>` transform;
//! the registry maps public strategy names onto implementations.

pub mod impact;
pub mod orchestrator;
pub mod sentiment;

use crate::article::{CanonicalArticle, ScoredArticle};
use crate::error::ValidationError;
use crate::features::FeatureExtractor;

pub use impact::FinancialImpactRanking;
pub use orchestrator::Ranker;
pub use sentiment::SentimentRanking;

/// Registry name of [`FinancialImpactRanking`].
pub const MARKET_IMPORTANCE: &str = "market_importance";
/// Registry name of [`SentimentRanking`].
pub const SENTIMENT: &str = "sentiment";

pub trait RankingStrategy: Send + Sync {
    /// Public name used to select the strategy.
    fn name(&self) -> &'static str;
    /// Scores and orders `articles`. Never mutates the input; empty in, empty out.
    fn rank(&self, articles: &[CanonicalArticle]) -> Vec<ScoredArticle>;
}

/// Named set of strategies, in registration order.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn RankingStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// `market_importance` + `sentiment`.
    pub fn standard(extractor: FeatureExtractor) -> Self {
        Self::new()
            .with(FinancialImpactRanking::new(extractor))
            .with(SentimentRanking)
    }

    pub fn with<S: RankingStrategy + 'static>(mut self, strategy: S) -> Self {
        self.register(Box::new(strategy));
        self
    }

    /// Registers a strategy; a later registration under the same name wins.
    pub fn register(&mut self, strategy: Box<dyn RankingStrategy>) {
        self.strategies.retain(|s| s.name() != strategy.name());
        self.strategies.push(strategy);
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Result<&dyn RankingStrategy, ValidationError> {
        self.strategies
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
            .ok_or_else(|| ValidationError::InvalidStrategy {
                name: name.to_string(),
                valid: self.names(),
            })
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard(FeatureExtractor::default())
    }
}

/// Percentile rank of each value within the batch, in `(0,1]`.
///
/// Ties share the average of the ranks they span, then ranks are divided by
/// the batch size (so the single element of a batch gets 1.0).
pub fn percentile_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1 ..= j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            out[idx] = avg_rank / n as f64;
        }
        i = j;
    }
    out
}

/// Writes 1-based positions into `rank` following the current order.
pub(crate) fn assign_positions(mut scored: Vec<ScoredArticle>) -> Vec<ScoredArticle> {
    for (i, s) in scored.iter_mut().enumerate() {
        s.rank = i + 1;
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_average_ties() {
        let p = percentile_ranks(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(p, vec![0.25, 0.625, 0.625, 1.0]);
    }

    #[test]
    fn percentile_single_and_empty() {
        assert_eq!(percentile_ranks(&[0.0]), vec![1.0]);
        assert!(percentile_ranks(&[]).is_empty());
    }

    #[test]
    fn percentile_all_equal() {
        let p = percentile_ranks(&[3.0, 3.0, 3.0]);
        assert!(p.iter().all(|&x| (x - 2.0 / 3.0).abs() < 1e-12));
    }

    #[test]
    fn registry_rejects_unknown_with_valid_set() {
        let reg = StrategyRegistry::default();
        let err = reg.get("popularity").err().unwrap();
        match err {
            ValidationError::InvalidStrategy { name, valid } => {
                assert_eq!(name, "popularity");
                assert_eq!(valid, vec![MARKET_IMPORTANCE.to_string(), SENTIMENT.to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(reg.get(MARKET_IMPORTANCE).is_ok());
    }
}
