use std::env;
use std::sync::OnceLock;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

/// Port the exporter bound on first successful install.
static EXPORTER_PORT: OnceLock<u16> = OnceLock::new();

pub const REQUESTS_TOTAL: &str = "gap_requests_total";
pub const DETECT_VERDICT_TOTAL: &str = "gap_detect_verdict_total";
pub const SCORE_CACHE_TOTAL: &str = "gap_score_cache_total";

/// Installs the global recorder and serves scrapes on `0.0.0.0:<port>`, the
/// port taken from `port_env` or `default_port`.
///
/// The listener runs on the ambient tokio runtime when there is one, otherwise
/// on a dedicated exporter thread. Returns the bound port; later calls return
/// the first one.
pub fn init_metrics(port_env: &str, default_port: u16) -> Option<u16> {
    if let Some(port) = EXPORTER_PORT.get() {
        return Some(*port);
    }

    let port = env::var(port_env)
        .ok()
        .and_then(|raw| raw.trim().parse::<u16>().ok())
        .unwrap_or(default_port);

    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
    {
        Ok(()) => {
            let _ = EXPORTER_PORT.set(port);
            info!(metrics_port = port, "prometheus exporter listening");
        }
        Err(err) => {
            warn!(error = %err, metrics_port = port, "prometheus exporter not started");
        }
    }
    EXPORTER_PORT.get().copied()
}

pub fn record_request(endpoint: &'static str) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
}

pub fn record_gap_verdict(is_gap: bool) {
    let verdict = if is_gap { "gap" } else { "covered" };
    metrics::counter!(DETECT_VERDICT_TOTAL, "verdict" => verdict).increment(1);
}

pub fn record_cache(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    metrics::counter!(SCORE_CACHE_TOTAL, "outcome" => outcome).increment(1);
}
