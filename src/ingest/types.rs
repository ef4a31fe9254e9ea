// src/ingest/types.rs
use serde_json::Value;

use crate::error::FetchError;

/// Source of raw article payloads (unstructured mappings).
#[async_trait::async_trait]
pub trait NewsFetcher: Send + Sync {
    async fn fetch_articles(&self, url: &str) -> Result<Vec<Value>, FetchError>;
    fn name(&self) -> &'static str;
}
