//! API DTOs

use crate::domain::binding::GamepadSnapshot;
use crate::domain::settings::GamepadField;
use crate::domain::shared::error::DomainError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Generic API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// HTTP status for a failed domain operation
pub fn error_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
        DomainError::InvalidOperation(_)
        | DomainError::InvalidStateTransition(_)
        | DomainError::NotLoaded => StatusCode::CONFLICT,
        DomainError::Persistence(_) | DomainError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Server settings update
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettingsRequest {
    pub ip: String,
    pub stream_port: u16,
    pub control_port: u16,
}

/// Binding field to capture or reset
#[derive(Debug, Serialize, Deserialize)]
pub struct BindingFieldRequest {
    pub field: GamepadField,
}

/// Controllers as currently reported by the UI
#[derive(Debug, Serialize, Deserialize)]
pub struct GamepadStateRequest {
    pub gamepads: Vec<GamepadSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GamepadStateResponse {
    pub connected: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelCaptureResponse {
    pub cancelled: bool,
}
