//! Sentiment ranking: negative news first, then positive, then neutral.
//! Labels outside that set sort after every mapped label.

use crate::article::{CanonicalArticle, ScoredArticle};

use super::{assign_positions, RankingStrategy, SENTIMENT};

/// Ordinal for a classifier label (case-insensitive). `None` for unmapped labels.
pub fn sentiment_ordinal(label: &str) -> Option<u8> {
    match label.trim().to_ascii_uppercase().as_str() {
        "NEGATIVE" => Some(1),
        "POSITIVE" => Some(2),
        "NEUTRAL" => Some(3),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentRanking;

impl RankingStrategy for SentimentRanking {
    fn name(&self) -> &'static str {
        SENTIMENT
    }

    fn rank(&self, articles: &[CanonicalArticle]) -> Vec<ScoredArticle> {
        let mut scored: Vec<ScoredArticle> = articles
            .iter()
            .map(|a| ScoredArticle {
                article: a.clone(),
                impact: None,
                sentiment_rank: sentiment_ordinal(&a.sentiment_label),
                rank: 0,
            })
            .collect();

        // Stable; unmapped (None) goes last.
        scored.sort_by_key(|s| s.sentiment_rank.unwrap_or(u8::MAX));
        assign_positions(scored)
    }
}
