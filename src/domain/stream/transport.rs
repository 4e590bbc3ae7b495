//! Media transport ports
//!
//! The manager never talks to a peer connection directly. A
//! [`TransportFactory`] builds one [`MediaTransport`] per attempt and wires its
//! callbacks to the [`TransportListener`] it was handed, which carries the
//! attempt generation so the manager can drop callbacks from superseded
//! attempts.

use crate::domain::stream::error::StreamError;
use crate::domain::stream::manager::TransportListener;
use async_trait::async_trait;
use std::sync::Arc;

/// One peer-to-peer media session, configured for inbound-only video
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Create and apply the local offer, returning its SDP text
    async fn create_offer(&self) -> Result<String, StreamError>;

    /// Apply the SDP answer returned by the signaling endpoint
    async fn apply_answer(&self, sdp: String) -> Result<(), StreamError>;

    /// Release the transport. Callbacks must not fire for it afterwards.
    async fn close(&self) -> Result<(), StreamError>;
}

/// Builds a fresh transport for each attempt
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Create a transport whose track and connectivity callbacks report to
    /// `listener`
    async fn create(&self, listener: TransportListener)
        -> Result<Arc<dyn MediaTransport>, StreamError>;
}
