//! Signaling adapters

pub mod whep;

pub use whep::{WhepClient, DEFAULT_REQUEST_TIMEOUT, SDP_CONTENT_TYPE};
