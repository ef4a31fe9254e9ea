// src/normalize/mod.rs
//! Article normalizer: raw, loosely shaped payloads → `CanonicalArticle`.
//!
//! Every item is validated and coerced exactly once, here. Failures are
//! isolated per item (logged + counted, item dropped); the batch always
//! completes and surviving items keep their input order.

pub mod literal;

use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use strsim::normalized_levenshtein;
use tracing::{debug, warn};

use crate::article::{CanonicalArticle, DEFAULT_SENTIMENT_LABEL, DEFAULT_TITLE, UNKNOWN_SOURCE};

/// Trailing metadata marker appended by the news source, e.g. `[+4155 chars]`.
static RE_CHARS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\+\d+ chars\]").expect("chars marker regex"));

/// Normalization policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizePolicy {
    /// Drop items whose `text` (or title) is empty instead of letting them
    /// through with defaults.
    pub drop_empty_text: bool,
    /// When set, drop an article whose title is at least this similar to an
    /// earlier surviving one.
    pub dedup_title_similarity: Option<f32>,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self {
            drop_empty_text: true,
            dedup_title_similarity: None,
        }
    }
}

/// Why an individual item did not survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NotAMapping,
    Uncoercible(&'static str),
    EmptyTitle,
    EmptyText,
    NearDuplicate,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::NotAMapping => "not_a_mapping",
            DropReason::Uncoercible(_) => "uncoercible_field",
            DropReason::EmptyTitle => "empty_title",
            DropReason::EmptyText => "empty_text",
            DropReason::NearDuplicate => "near_duplicate",
        }
    }
}

/// Output of a batch run: survivors plus `(input index, reason)` for drops.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    pub articles: Vec<CanonicalArticle>,
    pub dropped: Vec<(usize, DropReason)>,
}

/// Normalizes a batch, discarding the drop diagnostics.
pub fn normalize_articles(raw: &[Value], policy: &NormalizePolicy) -> Vec<CanonicalArticle> {
    normalize_with_report(raw, policy).articles
}

/// Normalizes a batch and reports which inputs were dropped and why.
pub fn normalize_with_report(raw: &[Value], policy: &NormalizePolicy) -> NormalizeReport {
    let mut report = NormalizeReport {
        articles: Vec::with_capacity(raw.len()),
        dropped: Vec::new(),
    };

    for (idx, item) in raw.iter().enumerate() {
        let outcome = normalize_one(item, policy).and_then(|article| {
            match policy.dedup_title_similarity {
                Some(threshold) if is_near_duplicate(&article, &report.articles, threshold) => {
                    Err(DropReason::NearDuplicate)
                }
                _ => Ok(article),
            }
        });

        match outcome {
            Ok(article) => report.articles.push(article),
            Err(reason) => {
                warn!(
                    target: "normalize",
                    idx,
                    id = %item_id(item),
                    reason = reason.as_str(),
                    "dropping article"
                );
                counter!("articles_dropped_total", "reason" => reason.as_str()).increment(1);
                report.dropped.push((idx, reason));
            }
        }
    }

    counter!("articles_kept_total").increment(report.articles.len() as u64);
    debug!(
        target: "normalize",
        kept = report.articles.len(),
        dropped = report.dropped.len(),
        "normalized batch"
    );
    report
}

/// Normalizes a single raw item.
pub fn normalize_one(
    item: &Value,
    policy: &NormalizePolicy,
) -> Result<CanonicalArticle, DropReason> {
    let obj = item.as_object().ok_or(DropReason::NotAMapping)?;

    let title = coerce_text(obj.get("title"), "title")?;
    let description = coerce_text(obj.get("description"), "description")?.unwrap_or_default();
    let content = coerce_text(obj.get("content"), "content")?
        .map(|c| clean_content(&c))
        .unwrap_or_default();

    let title = match title {
        Some(t) if !t.is_empty() => t,
        Some(_) if policy.drop_empty_text => return Err(DropReason::EmptyTitle),
        _ => DEFAULT_TITLE.to_string(),
    };

    let text = format!("{description} {content}").trim().to_string();
    if text.is_empty() && policy.drop_empty_text {
        return Err(DropReason::EmptyText);
    }

    Ok(CanonicalArticle {
        title,
        content,
        description,
        text,
        published_at: coerce_text(obj.get("publishedAt"), "publishedAt")?.unwrap_or_default(),
        source: extract_source(obj.get("source")),
        url: coerce_text(obj.get("url"), "url")?.unwrap_or_default(),
        sentiment_label: sentiment_label(obj.get("sentiment_label")),
        sentiment_score: sentiment_score(obj.get("sentiment_score")),
    })
}

/// Strips `[+NNNN chars]` markers and surrounding whitespace.
pub fn clean_content(s: &str) -> String {
    RE_CHARS_MARKER.replace_all(s, "").trim().to_string()
}

/// Resolves the source name from either a nested `{name: ..}` mapping, a
/// mapping literal stored as text, or a plain name.
pub fn extract_source(v: Option<&Value>) -> String {
    let name = match v {
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        Some(Value::String(s)) => {
            literal::source_name(s).or_else(|| Some(s.trim().to_string()).filter(|s| !s.is_empty()))
        }
        _ => None,
    };
    name.unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// String coercion: strings and scalars convert, null/missing is `None`,
/// nested structures cannot be coerced.
fn coerce_text(v: Option<&Value>, field: &'static str) -> Result<Option<String>, DropReason> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_)) | Some(Value::Object(_)) => Err(DropReason::Uncoercible(field)),
    }
}

fn sentiment_label(v: Option<&Value>) -> String {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SENTIMENT_LABEL)
        .to_string()
}

fn sentiment_score(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn is_near_duplicate(article: &CanonicalArticle, kept: &[CanonicalArticle], threshold: f32) -> bool {
    if article.title == DEFAULT_TITLE {
        return false;
    }
    let title = article.title.to_lowercase();
    kept.iter()
        .filter(|k| k.title != DEFAULT_TITLE)
        .any(|k| normalized_levenshtein(&title, &k.title.to_lowercase()) as f32 >= threshold)
}

/// Short anonymised id for diagnostics; raw text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn item_id(item: &Value) -> String {
    let key = item
        .get("url")
        .and_then(Value::as_str)
        .or_else(|| item.get("title").and_then(Value::as_str))
        .unwrap_or_default();
    anon_hash(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_chars_marker() {
        assert_eq!(
            clean_content("Markets rallied today. [+4155 chars]"),
            "Markets rallied today."
        );
        assert_eq!(clean_content("  no marker  "), "no marker");
    }

    #[test]
    fn source_shapes() {
        assert_eq!(extract_source(Some(&json!({"id": null, "name": "CNBC"}))), "CNBC");
        assert_eq!(extract_source(Some(&json!("Bloomberg"))), "Bloomberg");
        assert_eq!(
            extract_source(Some(&json!("{'id': 'reuters', 'name': 'Reuters'}"))),
            "Reuters"
        );
        assert_eq!(extract_source(Some(&json!({"id": "x"}))), UNKNOWN_SOURCE);
        assert_eq!(extract_source(Some(&json!("   "))), UNKNOWN_SOURCE);
        assert_eq!(extract_source(None), UNKNOWN_SOURCE);
    }

    #[test]
    fn nested_title_is_uncoercible() {
        let item = json!({"title": {"x": 1}, "description": "d"});
        assert_eq!(
            normalize_one(&item, &NormalizePolicy::default()),
            Err(DropReason::Uncoercible("title"))
        );
    }

    #[test]
    fn empty_text_policy_is_explicit() {
        let item = json!({"title": "Only a title", "description": "", "content": null});
        assert_eq!(
            normalize_one(&item, &NormalizePolicy::default()),
            Err(DropReason::EmptyText)
        );

        let keep = NormalizePolicy {
            drop_empty_text: false,
            ..Default::default()
        };
        let a = normalize_one(&item, &keep).unwrap();
        assert_eq!(a.text, "");
        assert_eq!(a.title, "Only a title");
    }

    #[test]
    fn missing_title_gets_placeholder() {
        let item = json!({"description": "Stocks rose."});
        let a = normalize_one(&item, &NormalizePolicy::default()).unwrap();
        assert_eq!(a.title, DEFAULT_TITLE);
        assert_eq!(a.sentiment_label, "NEUTRAL");
        assert_eq!(a.sentiment_score, 0.0);
    }

    #[test]
    fn near_duplicate_titles_keep_first() {
        let raw = vec![
            json!({"title": "Fed raises rates by 25bp", "description": "a"}),
            json!({"title": "Fed raises rates by 25 bp", "description": "b"}),
            json!({"title": "Oil slides on supply glut", "description": "c"}),
        ];
        let policy = NormalizePolicy {
            dedup_title_similarity: Some(0.9),
            ..Default::default()
        };
        let report = normalize_with_report(&raw, &policy);
        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.articles[0].description, "a");
        assert_eq!(report.dropped, vec![(1, DropReason::NearDuplicate)]);
    }

    #[test]
    fn anon_hash_is_short_hex() {
        let h = anon_hash("https://example.com/a");
        assert_eq!(h.len(), 12);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
