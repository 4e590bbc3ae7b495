//! Settings bounded context - operator configuration and its persistence

pub mod model;
pub mod repository;
pub mod store;

pub use model::{Config, ControlSource, GamepadBindings, GamepadField, KeyboardBindings};
pub use repository::ConfigRepository;
pub use store::{ConfigNotification, ConfigStore};
