//! API Router configuration

use super::binding_handler::{cancel_capture, capture_binding, reset_binding, update_gamepad_state};
use super::config_handler::{
    get_config, health_check, put_config, put_gamepad_bindings, put_keyboard_bindings,
    put_server_settings,
};
use super::metrics_handler::metrics_handler;
use super::state::AppState;
use super::stream_handler::{get_stream_status, restart_stream};
use super::ws_handler::ws_handler;
use axum::{
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let health_routes = Router::new().route("/health", get(health_check));

    // Operator configuration routes
    let config_routes = Router::new()
        .route("/config", get(get_config).put(put_config))
        .route("/config/server", put(put_server_settings))
        .route("/config/keyboard", put(put_keyboard_bindings))
        .route("/config/gamepad", put(put_gamepad_bindings));

    // Stream routes
    let stream_routes = Router::new()
        .route("/stream", get(get_stream_status))
        .route("/stream/restart", post(restart_stream));

    // Gamepad and binding capture routes
    let binding_routes = Router::new()
        .route("/gamepad/state", post(update_gamepad_state))
        .route("/bindings/capture", post(capture_binding))
        .route("/bindings/capture/cancel", post(cancel_capture))
        .route("/bindings/reset", post(reset_binding));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .merge(health_routes)
        .merge(config_routes)
        .merge(stream_routes)
        .merge(binding_routes)
        .route("/ws", get(ws_handler))
        .with_state(state)
        .merge(metrics_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
