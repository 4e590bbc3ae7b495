//! WebRTC media transport
//!
//! Receive-only video peer connection built on webrtc-rs. Offers are sent
//! once ICE gathering has completed, so the drone gets every candidate in
//! the initial SDP.

use crate::domain::stream::error::StreamError;
use crate::domain::stream::manager::TransportListener;
use crate::domain::stream::transport::{MediaTransport, TransportFactory};
use crate::domain::stream::value_object::ConnectivityState;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::track::track_remote::TrackRemote;

impl From<RTCIceConnectionState> for ConnectivityState {
    fn from(state: RTCIceConnectionState) -> Self {
        match state {
            RTCIceConnectionState::Unspecified | RTCIceConnectionState::New => {
                ConnectivityState::New
            }
            RTCIceConnectionState::Checking => ConnectivityState::Checking,
            RTCIceConnectionState::Connected => ConnectivityState::Connected,
            RTCIceConnectionState::Completed => ConnectivityState::Completed,
            RTCIceConnectionState::Disconnected => ConnectivityState::Disconnected,
            RTCIceConnectionState::Failed => ConnectivityState::Failed,
            RTCIceConnectionState::Closed => ConnectivityState::Closed,
        }
    }
}

fn negotiation_error(context: &str, e: webrtc::Error) -> StreamError {
    StreamError::Negotiation(format!("{}: {}", context, e))
}

/// Builds receive-only video peer connections
pub struct WebRtcTransportFactory {
    ice_servers: Vec<String>,
}

impl WebRtcTransportFactory {
    pub fn new(ice_servers: Vec<String>) -> Self {
        Self { ice_servers }
    }

    async fn peer_connection(&self) -> Result<RTCPeerConnection, StreamError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| negotiation_error("Failed to register codecs", e))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| negotiation_error("Failed to register interceptors", e))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if self.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: self.ice_servers.clone(),
                ..Default::default()
            }]
        };

        api.new_peer_connection(RTCConfiguration {
            ice_servers,
            ..Default::default()
        })
        .await
        .map_err(|e| negotiation_error("Failed to create peer connection", e))
    }
}

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn create(
        &self,
        listener: TransportListener,
    ) -> Result<Arc<dyn MediaTransport>, StreamError> {
        let pc = Arc::new(self.peer_connection().await?);
        add_video_receiver(&pc).await?;

        let track_listener = listener.clone();
        pc.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let listener = track_listener.clone();
            Box::pin(async move {
                listener.on_track();
                tokio::spawn(watch_first_frame(track, listener));
            })
        }));

        let ice_listener = listener.clone();
        pc.on_ice_connection_state_change(Box::new(move |state: RTCIceConnectionState| {
            ice_listener.on_connectivity_change(state.into());
            Box::pin(async {})
        }));

        debug!("Created peer connection for stream {}", listener.generation());
        Ok(Arc::new(WebRtcTransport { pc }))
    }
}

/// Add the receive-only video transceiver, closing `pc` if that fails
async fn add_video_receiver(pc: &RTCPeerConnection) -> Result<(), StreamError> {
    let added = pc
        .add_transceiver_from_kind(
            RTPCodecType::Video,
            Some(RTCRtpTransceiverInit {
                direction: RTCRtpTransceiverDirection::Recvonly,
                send_encodings: vec![],
            }),
        )
        .await;

    if let Err(e) = added {
        if let Err(close_error) = pc.close().await {
            warn!("Failed to close peer connection: {}", close_error);
        }
        return Err(negotiation_error("Failed to add video transceiver", e));
    }
    Ok(())
}

/// Report playback on the first RTP packet, then keep draining the track so
/// the receiver does not back up
async fn watch_first_frame(track: Arc<TrackRemote>, listener: TransportListener) {
    if track.read_rtp().await.is_err() {
        return;
    }

    info!(
        "Stream {}: first frame received on track {}",
        listener.generation(),
        track.ssrc()
    );
    listener.on_media_playing();

    while track.read_rtp().await.is_ok() {}
    debug!("Stream {}: remote track ended", listener.generation());
}

/// One receive-only peer connection
pub struct WebRtcTransport {
    pc: Arc<RTCPeerConnection>,
}

#[async_trait]
impl MediaTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<String, StreamError> {
        let offer = self
            .pc
            .create_offer(None)
            .await
            .map_err(|e| negotiation_error("Failed to create offer", e))?;

        let mut gathered = self.pc.gathering_complete_promise().await;
        self.pc
            .set_local_description(offer)
            .await
            .map_err(|e| negotiation_error("Failed to set local description", e))?;
        let _ = gathered.recv().await;

        let local = self
            .pc
            .local_description()
            .await
            .ok_or_else(|| StreamError::Negotiation("No local description".to_string()))?;

        Ok(local.sdp)
    }

    async fn apply_answer(&self, sdp: String) -> Result<(), StreamError> {
        let answer = RTCSessionDescription::answer(sdp)
            .map_err(|e| negotiation_error("Invalid SDP answer", e))?;

        self.pc
            .set_remote_description(answer)
            .await
            .map_err(|e| negotiation_error("Failed to set remote description", e))
    }

    async fn close(&self) -> Result<(), StreamError> {
        self.pc
            .close()
            .await
            .map_err(|e| StreamError::Transport(format!("Failed to close peer connection: {}", e)))
    }
}
