//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Coordinating the config store with the stream and capture contexts
//! - Keeping at most one binding capture running

pub mod binding_service;
pub mod settings_service;

pub use binding_service::{BindingService, CaptureOutcome};
pub use settings_service::SettingsService;
