//! Domain events infrastructure

use chrono::{DateTime, Utc};

/// Base trait for all domain events
pub trait DomainEvent: Send + Sync {
    /// Dotted event name, e.g. `stream.state_changed`
    fn event_type(&self) -> &'static str;

    /// Returns when the event occurred
    fn occurred_at(&self) -> DateTime<Utc>;
}
