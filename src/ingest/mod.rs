// src/ingest/mod.rs
//! News fetching collaborator: query validation, URL building and the
//! NewsAPI client.

pub mod newsapi;
pub mod types;

use crate::config::NewsConfig;
use crate::error::ValidationError;

pub use newsapi::NewsApiClient;
pub use types::NewsFetcher;

/// Checks `query` against the allow-list (case-insensitive).
pub fn validate_query(query: &str, news: &NewsConfig) -> Result<(), ValidationError> {
    let q = query.trim();
    if news
        .allowed_queries
        .iter()
        .any(|allowed| allowed.trim().eq_ignore_ascii_case(q))
    {
        Ok(())
    } else {
        Err(ValidationError::InvalidQuery {
            query: query.to_string(),
            allowed: news.allowed_queries.clone(),
        })
    }
}

/// Validates `query` and fills the URL template.
pub fn build_query_url(
    query: &str,
    news: &NewsConfig,
    api_key: Option<&str>,
) -> Result<String, ValidationError> {
    validate_query(query, news)?;
    Ok(news
        .query_url
        .replace("{query}", &urlencoding::encode(query.trim()))
        .replace("{api_key}", &urlencoding::encode(api_key.unwrap_or_default())))
}

/// URL with the `apiKey` value masked, for logs.
pub fn redact_url(url: &str, api_key: Option<&str>) -> String {
    match api_key.filter(|k| !k.is_empty()) {
        Some(k) => url.replace(&*urlencoding::encode(k), "***"),
        None => url.to_string(),
    }
}
