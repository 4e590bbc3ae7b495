//! Domain layer - Core logic and rules
//!
//! This layer contains:
//! - stream: lifecycle of the live video session (negotiate, play, retry)
//! - binding: capture of controller inputs into control bindings
//! - settings: operator configuration and its persistence port
//! - shared: errors, events and value objects used by all of the above

pub mod binding;
pub mod settings;
pub mod shared;
pub mod stream;

// Re-export commonly used types
pub use shared::{DomainError, Result};
