//! Stream value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the live video session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    /// Nothing started yet
    Idle,
    /// Offer/answer exchange in progress, or negotiated but no frame seen yet
    Negotiating,
    /// First media frame delivered
    Playing,
    /// Last attempt failed; a retry is pending
    Failed,
    /// Manager disposed
    Closed,
}

impl StreamState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, new_state: StreamState) -> bool {
        use StreamState::*;

        match (self, new_state) {
            (Idle, Negotiating) => true,

            (Negotiating, Playing) => true,
            (Negotiating, Failed) => true,

            (Playing, Failed) => true,
            // Explicit restart of a healthy session
            (Playing, Negotiating) => true,

            (Failed, Negotiating) => true,

            // Can't leave Closed
            (Closed, _) => false,
            (_, Closed) => true,

            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Negotiating => "negotiating",
            StreamState::Playing => "playing",
            StreamState::Failed => "failed",
            StreamState::Closed => "closed",
        }
    }

    /// Text the video surface shows over the (not yet playing) feed
    pub fn overlay_message(&self) -> Option<&'static str> {
        match self {
            StreamState::Idle | StreamState::Negotiating => {
                Some("Connecting to CyberFish drone camera...")
            }
            StreamState::Failed => Some("Unable to connect to drone camera. Retrying..."),
            StreamState::Playing | StreamState::Closed => None,
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectivity of the media transport as reported by ICE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl ConnectivityState {
    /// States that end the current attempt
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ConnectivityState::Failed | ConnectivityState::Disconnected | ConnectivityState::Closed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityState::New => "new",
            ConnectivityState::Checking => "checking",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Completed => "completed",
            ConnectivityState::Disconnected => "disconnected",
            ConnectivityState::Failed => "failed",
            ConnectivityState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
