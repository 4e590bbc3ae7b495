//! Shared value objects used across multiple bounded contexts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one negotiation attempt of the stream connection manager.
///
/// Every attempt gets a strictly larger generation than the one before it,
/// so a callback tagged with an older generation can be recognised as stale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AttemptGeneration(u64);

impl AttemptGeneration {
    pub const INITIAL: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The generation that follows this one
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// HTTP location of the drone's WHEP signaling endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhepEndpoint {
    host: String,
    port: u16,
    path: String,
}

impl WhepEndpoint {
    pub const DEFAULT_PATH: &'static str = "/cam/whep";

    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }

        Self {
            host: host.into(),
            port,
            path,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full URL the SDP offer is posted to
    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WhepEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals must be bracketed in a URL authority
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "http://[{}]:{}{}", self.host, self.port, self.path)
        } else {
            write!(f, "http://{}:{}{}", self.host, self.port, self.path)
        }
    }
}
