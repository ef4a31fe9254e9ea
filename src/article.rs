//! # Article records
//! Canonical, schema-stable article shape used throughout ranking, plus the
//! scored output shape and the fixed status vocabulary returned to callers.

use serde::{Deserialize, Serialize};

/// Placeholder title for articles delivered without one.
pub const DEFAULT_TITLE: &str = "No Title";
/// Source name used when the raw `source` field cannot be resolved.
pub const UNKNOWN_SOURCE: &str = "unknown";
/// Label used before (or without) a classifier prediction.
pub const DEFAULT_SENTIMENT_LABEL: &str = "NEUTRAL";

/// Normalized news article. Built only by the normalizer; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalArticle {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
    /// `description` + `content`, trimmed. All scoring runs on this field.
    #[serde(default)]
    pub text: String,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_label")]
    pub sentiment_label: String,
    #[serde(default)]
    pub sentiment_score: f64,
}

fn default_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

fn default_label() -> String {
    DEFAULT_SENTIMENT_LABEL.to_string()
}

impl CanonicalArticle {
    /// Returns a copy carrying the given classifier prediction.
    pub fn with_sentiment(&self, label: impl Into<String>, score: f64) -> Self {
        Self {
            sentiment_label: label.into(),
            sentiment_score: score,
            ..self.clone()
        }
    }
}

/// Derived feature columns produced by the financial-impact strategy.
///
/// The first four are batch percentile ranks in `[0,1]`; `source_credibility`
/// keeps its raw table value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactFeatures {
    pub sentiment_strength: f64,
    pub entity_density: f64,
    pub market_verbs: f64,
    pub novelty_score: f64,
    pub source_credibility: f64,
    pub market_impact: f64,
}

/// Canonical article plus strategy-specific columns and its final position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: CanonicalArticle,
    #[serde(flatten)]
    pub impact: Option<ImpactFeatures>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_rank: Option<u8>,
    /// 1-based position in the ranked output.
    pub rank: usize,
}

/// Fixed status vocabulary surfaced to the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    FetchSuccess,
    FetchFailure,
    ProcessSuccess,
    ProcessFailure,
    PredictionFailure,
}

impl Status {
    /// Machine identifier, e.g. `fetch-failure`.
    pub fn code(self) -> &'static str {
        match self {
            Status::FetchSuccess => "fetch-success",
            Status::FetchFailure => "fetch-failure",
            Status::ProcessSuccess => "process-success",
            Status::ProcessFailure => "process-failure",
            Status::PredictionFailure => "prediction-failure",
        }
    }

    /// Human-readable message shown alongside the code.
    pub fn message(self) -> &'static str {
        match self {
            Status::FetchSuccess => "Successfully fetched news articles.",
            Status::FetchFailure => "Failed to fetch news articles.",
            Status::ProcessSuccess => "News processed and saved successfully.",
            Status::ProcessFailure => "Error occurred while processing news.",
            Status::PredictionFailure => "Sentiment prediction failed.",
        }
    }
}

/// Structured result envelope: a status plus data (empty on failure).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub message: Status,
    pub detail: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_status: Option<Status>,
    pub data: Vec<T>,
}

impl<T> Outcome<T> {
    pub fn success(message: Status, data: Vec<T>) -> Self {
        Self {
            message,
            detail: message.message(),
            save_status: None,
            data,
        }
    }

    pub fn failure(message: Status) -> Self {
        Self {
            message,
            detail: message.message(),
            save_status: None,
            data: Vec::new(),
        }
    }

    pub fn with_save_status(mut self, status: Status) -> Self {
        self.save_status = Some(status);
        self
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.message,
            Status::FetchFailure | Status::ProcessFailure | Status::PredictionFailure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_kebab_code() {
        let s = serde_json::to_string(&Status::PredictionFailure).unwrap();
        assert_eq!(s, "\"prediction-failure\"");
        assert_eq!(Status::FetchSuccess.code(), "fetch-success");
    }

    #[test]
    fn failure_outcome_has_empty_data() {
        let o: Outcome<CanonicalArticle> = Outcome::failure(Status::FetchFailure);
        assert!(o.data.is_empty());
        assert!(o.is_failure());
        assert_eq!(o.detail, "Failed to fetch news articles.");
    }

    #[test]
    fn scored_article_flattens_features() {
        let a = CanonicalArticle {
            title: "T".into(),
            content: "c".into(),
            description: "d".into(),
            text: "d c".into(),
            published_at: "2024-01-01T00:00:00Z".into(),
            source: "Reuters".into(),
            url: "https://example.com".into(),
            sentiment_label: "POSITIVE".into(),
            sentiment_score: 0.9,
        };
        let s = ScoredArticle {
            article: a,
            impact: Some(ImpactFeatures {
                sentiment_strength: 1.0,
                entity_density: 1.0,
                market_verbs: 1.0,
                novelty_score: 1.0,
                source_credibility: 0.93,
                market_impact: 0.993,
            }),
            sentiment_rank: None,
            rank: 1,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["publishedAt"], "2024-01-01T00:00:00Z");
        assert!(v.get("market_impact").is_some());
        assert!(v.get("sentiment_rank").is_none());
        assert_eq!(v["rank"], 1);
    }
}
