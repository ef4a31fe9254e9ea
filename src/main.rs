//! Financial news ranking service: binary entrypoint.
//! Boots the Axum HTTP server, wiring configuration, shared state, and metrics.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finnews_ranker::config::{AppConfig, LoggingConfig, Secrets};
use finnews_ranker::metrics::Metrics;

/// `RUST_LOG` wins; otherwise the configured level. JSON or compact output.
fn init_tracing(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,reqwest=warn", cfg.level)));

    let registry = tracing_subscriber::registry().with(filter);
    // Shuttle may have installed a subscriber already; keep it in that case.
    let _ = if cfg.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let cfg = AppConfig::load_default().context("loading configuration")?;
    init_tracing(&cfg.logging);

    let secrets = Secrets::from_env();
    tracing::info!(app = %cfg.app.name, version = %cfg.app.version, ?secrets, "starting");

    let metrics = Metrics::install().context("installing prometheus recorder")?;
    let router = finnews_ranker::app(&cfg, &secrets, &metrics)?;

    Ok(router.into())
}
