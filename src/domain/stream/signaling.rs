//! Signaling endpoint port

use crate::domain::shared::value_objects::WhepEndpoint;
use crate::domain::stream::error::StreamError;
use async_trait::async_trait;

/// Exchanges an SDP offer for an SDP answer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalingClient: Send + Sync {
    /// Send the raw offer and return the raw answer
    async fn exchange(&self, offer: &str) -> Result<String, StreamError>;

    /// Point subsequent exchanges at a different endpoint
    fn retarget(&self, _endpoint: WhepEndpoint) {}
}
