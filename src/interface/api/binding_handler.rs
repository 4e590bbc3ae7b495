//! Gamepad and binding capture handlers

use super::dto::{
    error_status, ApiResponse, BindingFieldRequest, CancelCaptureResponse, GamepadStateRequest,
    GamepadStateResponse,
};
use super::state::AppState;
use crate::application::CaptureOutcome;
use crate::domain::settings::Config;
use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, error, info};

/// Replace the controller snapshots used by binding capture
pub async fn update_gamepad_state(
    State(state): State<AppState>,
    Json(req): Json<GamepadStateRequest>,
) -> Json<ApiResponse<GamepadStateResponse>> {
    let connected = req.gamepads.len();
    debug!("API: {} gamepad(s) reported", connected);

    state.gamepads.update(req.gamepads);
    Json(ApiResponse::success(GamepadStateResponse { connected }))
}

/// Record one input for a gamepad binding field.
///
/// Completes when an input is captured or the capture is cancelled.
pub async fn capture_binding(
    State(state): State<AppState>,
    Json(req): Json<BindingFieldRequest>,
) -> (StatusCode, Json<ApiResponse<CaptureOutcome>>) {
    info!("API: Capturing binding for {}", req.field);

    match state.bindings.capture(req.field).await {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::success(outcome))),
        Err(e) => {
            error!("API: Binding capture failed: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Abandon the running capture
pub async fn cancel_capture(
    State(state): State<AppState>,
) -> Json<ApiResponse<CancelCaptureResponse>> {
    let cancelled = state.bindings.cancel();
    info!("API: Cancel capture (running: {})", cancelled);
    Json(ApiResponse::success(CancelCaptureResponse { cancelled }))
}

/// Restore a field's default binding
pub async fn reset_binding(
    State(state): State<AppState>,
    Json(req): Json<BindingFieldRequest>,
) -> (StatusCode, Json<ApiResponse<Config>>) {
    info!("API: Resetting binding for {}", req.field);

    match state.bindings.reset_to_default(req.field).await {
        Ok(config) => (StatusCode::OK, Json(ApiResponse::success(config))),
        Err(e) => {
            error!("API: Binding reset failed: {}", e);
            (error_status(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}
