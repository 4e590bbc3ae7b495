//! Shared handler state

use crate::application::{BindingService, SettingsService};
use crate::domain::binding::SharedGamepadSource;
use crate::domain::settings::ConfigStore;
use crate::domain::stream::StreamConnectionManager;
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config_store: Arc<ConfigStore>,
    pub settings: Arc<SettingsService>,
    pub stream: StreamConnectionManager,
    pub gamepads: Arc<SharedGamepadSource>,
    pub bindings: Arc<BindingService>,
}
