//! WHEP signaling client
//!
//! Posts the raw SDP offer to the drone's WHEP endpoint and returns the raw
//! SDP answer from the response body.

use crate::domain::shared::value_objects::WhepEndpoint;
use crate::domain::stream::error::StreamError;
use crate::domain::stream::signaling::SignalingClient;
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info};

pub const SDP_CONTENT_TYPE: &str = "application/sdp";

/// Default bound on one offer/answer round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// WHEP client
pub struct WhepClient {
    http: reqwest::Client,
    endpoint: RwLock<WhepEndpoint>,
}

impl WhepClient {
    pub fn new(endpoint: WhepEndpoint, timeout: Duration) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StreamError::Signaling(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: RwLock::new(endpoint),
        })
    }

    pub fn endpoint(&self) -> WhepEndpoint {
        self.endpoint.read().clone()
    }
}

#[async_trait]
impl SignalingClient for WhepClient {
    async fn exchange(&self, offer: &str) -> Result<String, StreamError> {
        let url = self.endpoint.read().url();
        debug!("Posting SDP offer ({} bytes) to {}", offer.len(), url);

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, SDP_CONTENT_TYPE)
            .body(offer.to_string())
            .send()
            .await
            .map_err(|e| StreamError::Signaling(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Signaling(format!(
                "{} responded with {}",
                url, status
            )));
        }

        let answer = response
            .text()
            .await
            .map_err(|e| StreamError::Signaling(format!("Failed to read answer: {}", e)))?;
        debug!("Received SDP answer ({} bytes), status {}", answer.len(), status);

        Ok(answer)
    }

    fn retarget(&self, endpoint: WhepEndpoint) {
        info!("WHEP endpoint set to {}", endpoint);
        *self.endpoint.write() = endpoint;
    }
}
