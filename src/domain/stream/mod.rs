//! Stream bounded context - lifecycle of the live video session

pub mod error;
pub mod event;
pub mod manager;
pub mod signaling;
pub mod transport;
pub mod value_object;

pub use error::StreamError;
pub use event::StreamEvent;
pub use manager::{
    ManagerOptions, StreamConnectionManager, StreamStatus, TransportListener, DEFAULT_RETRY_DELAY,
};
pub use signaling::SignalingClient;
pub use transport::{MediaTransport, TransportFactory};
pub use value_object::{ConnectivityState, StreamState};
