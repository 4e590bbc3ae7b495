//! Media transport implementations

pub mod webrtc_transport;

pub use webrtc_transport::{WebRtcTransport, WebRtcTransportFactory};
