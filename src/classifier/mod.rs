// src/classifier/mod.rs
//! Sentiment classifier contract: `text → {label, score}`.
//!
//! The model behind it is a black box. Empty input never reaches the model;
//! it short-circuits to `{label: "Neutral", score: 0.0}`.

pub mod huggingface;
pub mod lexicon;

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::article::CanonicalArticle;
use crate::config::{ClassifierProvider, SentimentModelConfig};
use crate::error::ClassifierError;

pub use huggingface::HuggingFaceClassifier;
pub use lexicon::LexiconClassifier;

/// Label returned for empty input without invoking the model.
pub const EMPTY_TEXT_LABEL: &str = "Neutral";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    pub fn empty_text() -> Self {
        Self {
            label: EMPTY_TEXT_LABEL.to_string(),
            score: 0.0,
        }
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Runs the model on non-empty text. Use [`predict`] from call sites.
    async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError>;
    /// Model/provider name for diagnostics.
    fn name(&self) -> &str;
}

pub type DynClassifier = Arc<dyn SentimentClassifier>;

/// Predicts `text`, short-circuiting empty input.
pub async fn predict(
    classifier: &dyn SentimentClassifier,
    text: &str,
) -> Result<Prediction, ClassifierError> {
    if text.trim().is_empty() {
        return Ok(Prediction::empty_text());
    }
    classifier.classify(text).await
}

/// Returns new articles carrying `sentiment_label`/`sentiment_score`.
/// The first classifier failure aborts the batch.
pub async fn predict_articles(
    classifier: &dyn SentimentClassifier,
    articles: &[CanonicalArticle],
) -> Result<Vec<CanonicalArticle>, ClassifierError> {
    let mut out = Vec::with_capacity(articles.len());
    for a in articles {
        let p = predict(classifier, &a.text).await.inspect_err(|e| {
            counter!("classifier_errors_total").increment(1);
            error!(target: "classifier", model = classifier.name(), error = %e, "sentiment prediction failed");
        })?;
        out.push(a.with_sentiment(p.label, p.score));
    }
    Ok(out)
}

/// Builds the configured classifier.
pub fn build_classifier(
    cfg: &SentimentModelConfig,
    hf_token: Option<String>,
) -> Result<DynClassifier, ClassifierError> {
    match cfg.provider {
        ClassifierProvider::HuggingFace => {
            info!(target: "classifier", model = %cfg.name, "using hosted sentiment model");
            let hf = HuggingFaceClassifier::new(&cfg.name, hf_token, cfg.max_length)?;
            Ok(Arc::new(hf))
        }
        ClassifierProvider::Lexicon => {
            info!(target: "classifier", "using offline lexicon classifier");
            Ok(Arc::new(LexiconClassifier::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SentimentClassifier for Counting {
        async fn classify(&self, _text: &str) -> Result<Prediction, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClassifierError::Empty);
            }
            Ok(Prediction {
                label: "POSITIVE".into(),
                score: 0.9,
            })
        }
        fn name(&self) -> &str {
            "counting"
        }
    }

    fn article(text: &str) -> CanonicalArticle {
        CanonicalArticle {
            title: "t".into(),
            content: text.into(),
            description: String::new(),
            text: text.into(),
            published_at: String::new(),
            source: "unknown".into(),
            url: String::new(),
            sentiment_label: "NEUTRAL".into(),
            sentiment_score: 0.0,
        }
    }

    #[tokio::test]
    async fn empty_text_short_circuits() {
        let c = Counting {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let p = predict(&c, "   ").await.unwrap();
        assert_eq!(p, Prediction::empty_text());
        assert_eq!(c.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn predicts_without_mutating_input() {
        let c = Counting {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let input = vec![article("Stocks up"), article("")];
        let out = predict_articles(&c, &input).await.unwrap();
        assert_eq!(out[0].sentiment_label, "POSITIVE");
        assert_eq!(out[1].sentiment_label, EMPTY_TEXT_LABEL);
        assert_eq!(input[0].sentiment_label, "NEUTRAL");
        assert_eq!(c.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_propagates() {
        let c = Counting {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        assert!(predict_articles(&c, &[article("x")]).await.is_err());
    }

    #[test]
    fn builds_configured_provider() {
        let mut cfg = SentimentModelConfig::default();
        let lexicon = build_classifier(&cfg, None).expect("lexicon");
        assert_eq!(lexicon.name(), "lexicon");

        cfg.provider = ClassifierProvider::HuggingFace;
        let hosted = build_classifier(&cfg, Some("tok".into())).expect("hosted");
        assert_eq!(hosted.name(), "ProsusAI/finbert");
    }
}
