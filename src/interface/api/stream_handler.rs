//! Stream API handlers

use super::dto::ApiResponse;
use super::state::AppState;
use crate::domain::stream::StreamStatus;
use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

/// Current stream status
pub async fn get_stream_status(State(state): State<AppState>) -> Json<ApiResponse<StreamStatus>> {
    Json(ApiResponse::success(state.stream.status()))
}

/// Start a fresh attempt, closing the current transport
pub async fn restart_stream(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<StreamStatus>>) {
    info!("API: Restarting stream");

    let stream = state.stream.clone();
    tokio::spawn(async move { stream.start().await });

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(state.stream.status())),
    )
}
