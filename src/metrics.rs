use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the known series.
    /// Fails if a recorder is already installed in this process.
    pub fn install() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe_all();
        Ok(Self { handle })
    }

    /// Recorder that is not installed globally: `/metrics` renders, but
    /// nothing the crate records reaches it. For tests and embedding.
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
        }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!("articles_fetched_total", "Raw articles returned by the news API");
    describe_counter!("articles_dropped_total", "Raw articles dropped during normalization");
    describe_counter!("articles_kept_total", "Articles that survived normalization");
    describe_counter!("classifier_errors_total", "Failed sentiment predictions");
    describe_counter!("ranking_requests_total", "Ranking passes per strategy");
    describe_counter!("pipeline_runs_total", "Completed fetch/process runs");
    describe_histogram!("ranking_ms", Unit::Milliseconds, "Ranking pass duration");
    describe_histogram!("news_fetch_ms", Unit::Milliseconds, "News API round trip");
    describe_gauge!("pipeline_last_run_ts", Unit::Seconds, "Unix time of the last completed run");
}
