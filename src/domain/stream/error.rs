//! Stream connection errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a stream attempt failed.
///
/// Every kind is handled the same way: the attempt is marked failed and a
/// single retry is scheduled.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum StreamError {
    /// Offer/answer construction or application failed
    #[error("Negotiation failed: {0}")]
    Negotiation(String),

    /// The WHEP request failed or returned a non-success status
    #[error("Signaling failed: {0}")]
    Signaling(String),

    /// ICE connectivity reported failed, disconnected or closed
    #[error("Transport failed: {0}")]
    Transport(String),
}

impl StreamError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            StreamError::Negotiation(_) => "negotiation",
            StreamError::Signaling(_) => "signaling",
            StreamError::Transport(_) => "transport",
        }
    }
}
