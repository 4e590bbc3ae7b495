//! Configuration API handlers

use super::dto::{error_status, ApiResponse, ServerSettingsRequest};
use super::state::AppState;
use crate::domain::settings::{Config, GamepadBindings, KeyboardBindings};
use crate::domain::shared::error::Result;
use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, info};

type ConfigResponse = (StatusCode, Json<ApiResponse<Config>>);

fn respond(operation: &str, result: Result<Config>) -> ConfigResponse {
    match result {
        Ok(config) => (StatusCode::OK, Json(ApiResponse::success(config))),
        Err(e) => {
            error!("API: Failed to {}: {}", operation, e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Health check
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("OK"))
}

/// Get the operator configuration, loading it on first use
pub async fn get_config(State(state): State<AppState>) -> ConfigResponse {
    respond("load config", state.config_store.get_or_load().await)
}

/// Replace the whole configuration
pub async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<Config>,
) -> ConfigResponse {
    info!("API: Replacing config");
    respond("replace config", state.settings.replace(config).await)
}

/// Update drone address and ports
pub async fn put_server_settings(
    State(state): State<AppState>,
    Json(req): Json<ServerSettingsRequest>,
) -> ConfigResponse {
    info!(
        "API: Updating server settings to {}:{} (control {})",
        req.ip, req.stream_port, req.control_port
    );

    let result = state
        .settings
        .update_server_settings(req.ip, req.stream_port, req.control_port)
        .await;
    respond("update server settings", result)
}

/// Replace the keyboard bindings
pub async fn put_keyboard_bindings(
    State(state): State<AppState>,
    Json(bindings): Json<KeyboardBindings>,
) -> ConfigResponse {
    info!("API: Updating keyboard bindings");

    let result = match state.config_store.get_or_load().await {
        Ok(_) => state.config_store.update_keyboard_bindings(bindings).await,
        Err(e) => Err(e),
    };
    respond("update keyboard bindings", result)
}

/// Replace the gamepad bindings
pub async fn put_gamepad_bindings(
    State(state): State<AppState>,
    Json(bindings): Json<GamepadBindings>,
) -> ConfigResponse {
    info!("API: Updating gamepad bindings");

    let result = match state.config_store.get_or_load().await {
        Ok(_) => state.config_store.update_gamepad_bindings(bindings).await,
        Err(e) => Err(e),
    };
    respond("update gamepad bindings", result)
}
