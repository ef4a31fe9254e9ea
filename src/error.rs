//! Error taxonomy shared by the pipeline, the stores and the ranking path.

use std::path::PathBuf;
use thiserror::Error;

/// User-facing, recoverable input errors. Always name the valid options.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid ranking type: {name}. Available types: {valid:?}")]
    InvalidStrategy { name: String, valid: Vec<String> },
    #[error("Invalid query: '{query}'. Allowed queries are: {allowed:?}")]
    InvalidQuery { query: String, allowed: Vec<String> },
}

/// Flat-file store failures. `Missing` lets callers tell "no data yet" apart
/// from a real read/write failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("store i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store csv error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Sentiment classifier failures. Fatal to the request that triggered them.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classifier returned status {0}")]
    Status(u16),
    #[error("classifier response could not be decoded: {0}")]
    Decode(String),
    #[error("classifier returned no prediction")]
    Empty,
}

/// News fetch failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("news request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("news api returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("news api response could not be decoded: {0}")]
    Decode(String),
    #[error("invalid news url: {0}")]
    Url(String),
}
