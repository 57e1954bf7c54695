//! Prometheus metrics

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::ServerError;

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Configuration(format!("Failed to install metrics recorder: {}", e)))
}

/// Count a handled request
pub fn record_request(endpoint: &'static str, status: u16) {
    metrics::counter!("avatar_requests_total", "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
}

pub fn record_llm_latency(ms: f64) {
    metrics::histogram!("avatar_llm_latency_ms").record(ms);
}

pub fn record_tts_latency(ms: f64) {
    metrics::histogram!("avatar_tts_latency_ms").record(ms);
}

/// Count a local-synthesis directive by failure bucket
pub fn record_voice_fallback(bucket: &'static str) {
    metrics::counter!("avatar_voice_fallback_total", "bucket" => bucket).increment(1);
}
