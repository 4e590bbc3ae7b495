//! Shared kernel - errors, events and value objects used by every bounded context

pub mod error;
pub mod events;
pub mod value_objects;

pub use error::{DomainError, Result};
pub use events::DomainEvent;
pub use value_objects::{AttemptGeneration, WhepEndpoint};
