//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - The WHEP signaling client
//! - The WebRTC media transport
//! - Config file persistence

pub mod media;
pub mod persistence;
pub mod signaling;
