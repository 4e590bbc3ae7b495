//! Stream events published to the UI surface

use crate::domain::shared::events::DomainEvent;
use crate::domain::shared::value_objects::AttemptGeneration;
use crate::domain::stream::error::StreamError;
use crate::domain::stream::value_object::StreamState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum StreamEvent {
    StateChanged {
        generation: AttemptGeneration,
        from: StreamState,
        to: StreamState,
        #[serde(rename = "occurredAt")]
        occurred_at: DateTime<Utc>,
    },
    AttemptFailed {
        generation: AttemptGeneration,
        error: StreamError,
        #[serde(rename = "occurredAt")]
        occurred_at: DateTime<Utc>,
    },
    RetryScheduled {
        generation: AttemptGeneration,
        #[serde(rename = "delayMs")]
        delay_ms: u64,
        #[serde(rename = "occurredAt")]
        occurred_at: DateTime<Utc>,
    },
}

impl StreamEvent {
    pub fn state_changed(generation: AttemptGeneration, from: StreamState, to: StreamState) -> Self {
        StreamEvent::StateChanged {
            generation,
            from,
            to,
            occurred_at: Utc::now(),
        }
    }

    pub fn attempt_failed(generation: AttemptGeneration, error: StreamError) -> Self {
        StreamEvent::AttemptFailed {
            generation,
            error,
            occurred_at: Utc::now(),
        }
    }

    pub fn retry_scheduled(generation: AttemptGeneration, delay_ms: u64) -> Self {
        StreamEvent::RetryScheduled {
            generation,
            delay_ms,
            occurred_at: Utc::now(),
        }
    }

    pub fn generation(&self) -> AttemptGeneration {
        match self {
            StreamEvent::StateChanged { generation, .. }
            | StreamEvent::AttemptFailed { generation, .. }
            | StreamEvent::RetryScheduled { generation, .. } => *generation,
        }
    }
}

impl DomainEvent for StreamEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::StateChanged { .. } => "stream.state_changed",
            StreamEvent::AttemptFailed { .. } => "stream.attempt_failed",
            StreamEvent::RetryScheduled { .. } => "stream.retry_scheduled",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StreamEvent::StateChanged { occurred_at, .. }
            | StreamEvent::AttemptFailed { occurred_at, .. }
            | StreamEvent::RetryScheduled { occurred_at, .. } => *occurred_at,
        }
    }
}
