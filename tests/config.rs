// tests/config.rs
//
// Config resolution: env path → default path → built-in defaults, plus the
// APP_NAME / APP_VERSION overrides. Env-touching tests run serially.

use std::io::Write;

use serial_test::serial;

use finnews_ranker::config::{AppConfig, ClassifierProvider, Secrets, ENV_CONFIG_PATH};

fn clear_env() {
    for key in [ENV_CONFIG_PATH, "APP_NAME", "APP_VERSION", "NEWS_API_KEY", "HF_API_TOKEN"] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn env_path_is_loaded() {
    clear_env();
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        r#"
[news]
allowed_queries = ["bonds"]

[models.sentiment_analysis_model]
provider = "hf"
max_length = 256

[ranking]
default_strategy = "sentiment"
default_limit = 3
"#
    )
    .unwrap();
    std::env::set_var(ENV_CONFIG_PATH, f.path());

    let cfg = AppConfig::load_default().expect("config loads");
    assert_eq!(cfg.news.allowed_queries, ["bonds"]);
    assert_eq!(cfg.models.sentiment_analysis_model.provider, ClassifierProvider::HuggingFace);
    assert_eq!(cfg.models.sentiment_analysis_model.max_length, 256);
    assert_eq!(cfg.ranking.default_strategy, "sentiment");
    assert_eq!(cfg.ranking.default_limit, 3);
    // untouched sections keep defaults
    assert!(cfg.pipeline.drop_empty_text);
    assert_eq!(cfg.logging.level, "info");

    clear_env();
}

#[test]
#[serial]
fn missing_env_path_is_an_error() {
    clear_env();
    std::env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");
    assert!(AppConfig::load_default().is_err());
    clear_env();
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    clear_env();
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "[news]\nquery_url = \"https://example.com/no-placeholder\"").unwrap();
    assert!(AppConfig::load_from(f.path()).is_err());

    let mut g = tempfile::NamedTempFile::new().unwrap();
    writeln!(g, "[pipeline]\ndedup_title_similarity = 0.0").unwrap();
    assert!(AppConfig::load_from(g.path()).is_err());
}

#[test]
#[serial]
fn app_identity_env_overrides_file() {
    clear_env();
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "[app]\nname = \"From File\"\nversion = \"1.0.0\"").unwrap();
    std::env::set_var("APP_NAME", "From Env");

    let cfg = AppConfig::load_from(f.path()).unwrap();
    assert_eq!(cfg.app.name, "From Env");
    assert_eq!(cfg.app.version, "1.0.0");
    clear_env();
}

#[test]
#[serial]
fn secrets_come_from_env_and_ignore_blanks() {
    clear_env();
    std::env::set_var("NEWS_API_KEY", "abc");
    std::env::set_var("HF_API_TOKEN", "   ");
    let s = Secrets::from_env();
    assert_eq!(s.news_api_key.as_deref(), Some("abc"));
    assert!(s.hf_api_token.is_none());
    clear_env();
}

#[test]
#[serial]
fn falls_back_to_defaults_without_any_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let prev = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let cfg = AppConfig::load_default();

    std::env::set_current_dir(prev).unwrap();
    let cfg = cfg.expect("defaults load");
    assert_eq!(cfg.ranking.default_strategy, "market_importance");
    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("assets"));
}
