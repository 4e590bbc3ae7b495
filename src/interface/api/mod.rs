//! API interface implementations

pub mod binding_handler;
pub mod config_handler;
pub mod dto;
pub mod metrics_handler;
pub mod router;
pub mod state;
pub mod stream_handler;
pub mod ws_handler;

pub use dto::ApiResponse;
pub use metrics_handler::{describe_metrics, init_metrics};
pub use router::build_router;
pub use state::AppState;
pub use ws_handler::BridgeEvent;
