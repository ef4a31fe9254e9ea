//! Hosted sentiment model via the Hugging Face Inference API.
//!
//! `POST {base}/models/{model}` with `{"inputs": text}`; the response is a list
//! (or list of lists) of `{label, score}`, of which the top score wins.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Prediction, SentimentClassifier};
use crate::error::ClassifierError;

pub const DEFAULT_INFERENCE_BASE: &str = "https://api-inference.huggingface.co";

pub struct HuggingFaceClassifier {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    token: Option<String>,
    max_length: usize,
}

impl HuggingFaceClassifier {
    pub fn new(
        model: &str,
        token: Option<String>,
        max_length: usize,
    ) -> Result<Self, ClassifierError> {
        Self::with_base(DEFAULT_INFERENCE_BASE, model, token, max_length)
    }

    pub fn with_base(
        base: &str,
        model: &str,
        token: Option<String>,
        max_length: usize,
    ) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .user_agent("finnews-ranker/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/models/{}", base.trim_end_matches('/'), model),
            model: model.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            max_length,
        })
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let input = truncate_tokens(text, self.max_length);
        let mut req = self.http.post(&self.endpoint).json(&json!({
            "inputs": input,
            "options": { "wait_for_model": true }
        }));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        debug!(target: "classifier", model = %self.model, bytes = body.len(), "inference response");
        parse_response(&body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Picks the highest-scoring label from an inference response body.
pub fn parse_response(body: &str) -> Result<Prediction, ClassifierError> {
    let parsed: InferenceResponse =
        serde_json::from_str(body).map_err(|e| ClassifierError::Decode(e.to_string()))?;
    let candidates = match parsed {
        InferenceResponse::Nested(v) => v.into_iter().next().unwrap_or_default(),
        InferenceResponse::Flat(v) => v,
    };
    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|ls| Prediction {
            label: ls.label,
            score: ls.score,
        })
        .ok_or(ClassifierError::Empty)
}

/// Keeps at most `max` whitespace tokens.
pub fn truncate_tokens(text: &str, max: usize) -> String {
    if max == 0 {
        return text.to_string();
    }
    text.split_whitespace().take(max).collect::<Vec<_>>().join(" ")
}
