//! Interface layer - External interfaces (API, WebSocket)
//!
//! This layer handles:
//! - REST API endpoints for the operator UI
//! - WebSocket event push
//! - Request/response formatting

pub mod api;
