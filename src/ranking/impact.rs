//! Financial-impact ranking: combine five weak text signals into a single
//! `market_impact` score and sort by it.
//!
//! 1. Extract raw features per article.
//! 2. Replace sentiment strength, entity density, market verbs and novelty by
//!    their batch percentile rank; credibility stays raw.
//! 3. Weighted sum (weights sum to 1.0).
//! 4. Stable sort, highest impact first; ties keep input order.

use std::cmp::Ordering;

use crate::article::{CanonicalArticle, ImpactFeatures, ScoredArticle};
use crate::features::{FeatureExtractor, RawFeatures};

use super::{assign_positions, percentile_ranks, RankingStrategy, MARKET_IMPORTANCE};

/// Composite weights. Must sum to exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactWeights {
    pub sentiment_strength: f64,
    pub entity_density: f64,
    pub market_verbs: f64,
    pub novelty_score: f64,
    pub source_credibility: f64,
}

pub const IMPACT_WEIGHTS: ImpactWeights = ImpactWeights {
    sentiment_strength: 0.30,
    entity_density: 0.25,
    market_verbs: 0.20,
    novelty_score: 0.15,
    source_credibility: 0.10,
};

impl ImpactWeights {
    pub fn sum(&self) -> f64 {
        self.sentiment_strength
            + self.entity_density
            + self.market_verbs
            + self.novelty_score
            + self.source_credibility
    }

    fn combine(&self, f: &ImpactFeatures) -> f64 {
        f.sentiment_strength * self.sentiment_strength
            + f.entity_density * self.entity_density
            + f.market_verbs * self.market_verbs
            + f.novelty_score * self.novelty_score
            + f.source_credibility * self.source_credibility
    }
}

#[derive(Debug, Clone, Default)]
pub struct FinancialImpactRanking {
    extractor: FeatureExtractor,
}

impl FinancialImpactRanking {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self { extractor }
    }

    /// Batch-normalized features for each article, in input order.
    pub fn features(&self, articles: &[CanonicalArticle]) -> Vec<ImpactFeatures> {
        let raw: Vec<RawFeatures> = articles
            .iter()
            .map(|a| self.extractor.extract(&a.text, &a.source))
            .collect();

        let strength = percentile_column(&raw, |r| r.sentiment_strength);
        let density = percentile_column(&raw, |r| r.entity_density as f64);
        let verbs = percentile_column(&raw, |r| r.market_verbs as f64);
        let novelty = percentile_column(&raw, |r| r.novelty_score);

        raw.iter()
            .enumerate()
            .map(|(i, r)| {
                let mut f = ImpactFeatures {
                    sentiment_strength: strength[i],
                    entity_density: density[i],
                    market_verbs: verbs[i],
                    novelty_score: novelty[i],
                    source_credibility: r.source_credibility,
                    market_impact: 0.0,
                };
                f.market_impact = IMPACT_WEIGHTS.combine(&f);
                f
            })
            .collect()
    }
}

impl RankingStrategy for FinancialImpactRanking {
    fn name(&self) -> &'static str {
        MARKET_IMPORTANCE
    }

    fn rank(&self, articles: &[CanonicalArticle]) -> Vec<ScoredArticle> {
        let mut scored: Vec<ScoredArticle> = articles
            .iter()
            .zip(self.features(articles))
            .map(|(a, f)| ScoredArticle {
                article: a.clone(),
                impact: Some(f),
                sentiment_rank: None,
                rank: 0,
            })
            .collect();

        // `sort_by` is stable: equal scores keep input order.
        scored.sort_by(|a, b| impact_of(b).partial_cmp(&impact_of(a)).unwrap_or(Ordering::Equal));
        assign_positions(scored)
    }
}

fn percentile_column(raw: &[RawFeatures], f: impl Fn(&RawFeatures) -> f64) -> Vec<f64> {
    let values: Vec<f64> = raw.iter().map(f).collect();
    percentile_ranks(&values)
}

fn impact_of(s: &ScoredArticle) -> f64 {
    s.impact.map(|f| f.market_impact).unwrap_or(0.0)
}
