//! Prometheus metrics handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics exporter
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

/// Register descriptions for the stream and config metrics
pub fn describe_metrics() {
    describe_counter!(
        "stream_attempts_total",
        "Total number of stream negotiation attempts"
    );
    describe_counter!(
        "stream_failures_total",
        "Total number of failed stream attempts by error kind"
    );
    describe_counter!(
        "stream_retries_total",
        "Total number of retries fired by the retry timer"
    );
    describe_gauge!(
        "stream_state",
        "1 for the current stream state, 0 for the others"
    );
    describe_counter!(
        "config_save_failures_total",
        "Total number of failed config saves"
    );
}

/// HTTP metrics handler
pub async fn metrics_handler(State(prometheus_handle): State<PrometheusHandle>) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}
