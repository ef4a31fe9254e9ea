// src/config.rs
//! Application configuration: TOML file + environment.
//!
//! Resolution order for the file:
//! 1) `$FINNEWS_CONFIG_PATH` (must exist)
//! 2) `config/app.toml`
//! 3) built-in defaults
//!
//! Secrets (`NEWS_API_KEY`, `HF_API_TOKEN`) come from the environment only.
//! `APP_NAME` / `APP_VERSION` override `[app]`. Built once at startup and
//! passed into constructors.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::normalize::NormalizePolicy;

pub const ENV_CONFIG_PATH: &str = "FINNEWS_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub news: NewsConfig,
    pub models: ModelsConfig,
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    pub ranking: RankingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Financial News Ranking API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// URL template with `{query}` and `{api_key}` placeholders.
    pub query_url: String,
    pub allowed_queries: Vec<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            query_url: "https://newsapi.org/v2/everything?q={query}&language=en&sortBy=publishedAt&apiKey={api_key}"
                .to_string(),
            allowed_queries: [
                "stock market",
                "finance",
                "economy",
                "inflation",
                "interest rates",
                "federal reserve",
                "earnings",
                "cryptocurrency",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub sentiment_analysis_model: SentimentModelConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    #[default]
    Lexicon,
    #[serde(alias = "hf")]
    HuggingFace,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentModelConfig {
    pub name: String,
    /// Max whitespace tokens sent to the model.
    pub max_length: usize,
    pub provider: ClassifierProvider,
}

impl Default for SentimentModelConfig {
    fn default() -> Self {
        Self {
            name: "ProsusAI/finbert".to_string(),
            max_length: 512,
            provider: ClassifierProvider::Lexicon,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub raw_file: String,
    pub processed_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("assets"),
            raw_file: "raw_news.csv".to_string(),
            processed_file: "processed_news.csv".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join(&self.raw_file)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.data_dir.join(&self.processed_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub drop_empty_text: bool,
    pub dedup_title_similarity: Option<f32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            drop_empty_text: true,
            dedup_title_similarity: None,
        }
    }
}

impl PipelineConfig {
    pub fn policy(&self) -> NormalizePolicy {
        NormalizePolicy {
            drop_empty_text: self.drop_empty_text,
            dedup_title_similarity: self.dedup_title_similarity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub default_strategy: String,
    pub default_limit: usize,
    pub credibility_path: Option<PathBuf>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_strategy: crate::ranking::MARKET_IMPORTANCE.to_string(),
            default_limit: 10,
            credibility_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Secrets read from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub news_api_key: Option<String>,
    pub hf_api_token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("news_api_key", &self.news_api_key.as_ref().map(|_| "***"))
            .field("hf_api_token", &self.hf_api_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            news_api_key: non_empty_env("NEWS_API_KEY"),
            hf_api_token: non_empty_env("HF_API_TOKEN"),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        cfg.with_env_overrides().validated()
    }

    /// Load using env var + fallbacks.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Self::default().with_env_overrides().validated()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(name) = non_empty_env("APP_NAME") {
            self.app.name = name;
        }
        if let Some(version) = non_empty_env("APP_VERSION") {
            self.app.version = version;
        }
        self
    }

    fn validated(self) -> Result<Self> {
        if let Some(t) = self.pipeline.dedup_title_similarity {
            if !(t > 0.0 && t <= 1.0) {
                bail!("pipeline.dedup_title_similarity must be in (0, 1], got {t}");
            }
        }
        if self.news.allowed_queries.is_empty() {
            bail!("news.allowed_queries must not be empty");
        }
        if !self.news.query_url.contains("{query}") {
            bail!("news.query_url must contain a {{query}} placeholder");
        }
        Ok(self)
    }
}
