//! CyberFish - operator control core for the CyberFish underwater drone
//!
//! This is a Domain-Driven Design (DDD) implementation of the drone
//! operator's host side: the live WHEP/WebRTC video session with automatic
//! retry, gamepad binding capture, and the persisted operator configuration,
//! exposed to the UI over a local HTTP/WebSocket bridge.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::error::Result;
