// src/ingest/newsapi.rs
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::FetchError;
use crate::ingest::types::NewsFetcher;

/// NewsAPI (`/v2/everything`) client. Returns the `articles` array untouched.
pub struct NewsApiClient {
    http: reqwest::Client,
}

impl NewsApiClient {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent("finnews-ranker/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl NewsFetcher for NewsApiClient {
    async fn fetch_articles(&self, url: &str) -> Result<Vec<Value>, FetchError> {
        let t0 = Instant::now();
        let url = reqwest::Url::parse(url).map_err(|e| FetchError::Url(e.to_string()))?;

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        let articles = extract_articles(body)?;

        histogram!("news_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("articles_fetched_total").increment(articles.len() as u64);
        Ok(articles)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

/// Pulls `articles` out of a NewsAPI response body; a missing list is empty.
pub fn extract_articles(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Object(mut map) => match map.remove("articles") {
            Some(Value::Array(items)) => Ok(items),
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(FetchError::Decode(format!(
                "`articles` is not a list: {}",
                type_name(&other)
            ))),
        },
        other => Err(FetchError::Decode(format!(
            "expected an object, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
