//! In-memory configuration store with optimistic persistence
//!
//! Updates are applied to the in-memory copy first and then persisted. A
//! failed save is reported through a [`ConfigNotification`] but the
//! in-memory copy keeps the new value. Saves are serialised and always write
//! the newest in-memory copy, so the last update is the last one on disk.

use crate::domain::settings::model::{Config, GamepadBindings, KeyboardBindings};
use crate::domain::settings::repository::ConfigRepository;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::events::DomainEvent;
use crate::domain::shared::error::Result;
use chrono::{DateTime, Utc};
use metrics::counter;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

/// User-facing notifications from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ConfigNotification {
    Updated {
        config: Config,
        #[serde(rename = "occurredAt")]
        occurred_at: DateTime<Utc>,
    },
    LoadFailed {
        message: String,
        #[serde(rename = "occurredAt")]
        occurred_at: DateTime<Utc>,
    },
    SaveFailed {
        message: String,
        #[serde(rename = "occurredAt")]
        occurred_at: DateTime<Utc>,
    },
}

impl ConfigNotification {
    fn updated(config: Config) -> Self {
        ConfigNotification::Updated {
            config,
            occurred_at: Utc::now(),
        }
    }

    fn load_failed(message: &str) -> Self {
        ConfigNotification::LoadFailed {
            message: message.to_string(),
            occurred_at: Utc::now(),
        }
    }

    fn save_failed(message: &str) -> Self {
        ConfigNotification::SaveFailed {
            message: message.to_string(),
            occurred_at: Utc::now(),
        }
    }
}

impl DomainEvent for ConfigNotification {
    fn event_type(&self) -> &'static str {
        match self {
            ConfigNotification::Updated { .. } => "config.updated",
            ConfigNotification::LoadFailed { .. } => "config.load_failed",
            ConfigNotification::SaveFailed { .. } => "config.save_failed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ConfigNotification::Updated { occurred_at, .. }
            | ConfigNotification::LoadFailed { occurred_at, .. }
            | ConfigNotification::SaveFailed { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Configuration store
pub struct ConfigStore {
    config: RwLock<Option<Config>>,
    repository: Arc<dyn ConfigRepository>,
    notifications: broadcast::Sender<ConfigNotification>,
    save_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(repository: Arc<dyn ConfigRepository>) -> Self {
        let (notifications, _) = broadcast::channel(32);

        Self {
            config: RwLock::new(None),
            repository,
            notifications,
            save_lock: Mutex::new(()),
        }
    }

    /// Current in-memory configuration, `None` until loaded
    pub fn config(&self) -> Option<Config> {
        self.config.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigNotification> {
        self.notifications.subscribe()
    }

    /// Load the configuration from the repository.
    ///
    /// On failure the in-memory state is left untouched.
    pub async fn load_config(&self) -> Result<Config> {
        match self.repository.get_config().await {
            Ok(config) => {
                info!("Configuration loaded (drone at {})", config.ip);
                *self.config.write() = Some(config.clone());
                Ok(config)
            }
            Err(e) => {
                error!("Failed to load config: {}", e);
                self.notify(ConfigNotification::load_failed("Failed to load config"));
                Err(e)
            }
        }
    }

    /// Loaded configuration, loading it first if needed
    pub async fn get_or_load(&self) -> Result<Config> {
        match self.config() {
            Some(config) => Ok(config),
            None => self.load_config().await,
        }
    }

    /// Replace the whole configuration
    pub async fn replace(&self, config: Config) -> Result<Config> {
        config.validate()?;
        *self.config.write() = Some(config.clone());
        self.persist().await;
        Ok(config)
    }

    pub async fn update_server_settings(
        &self,
        ip: String,
        stream_port: u16,
        control_port: u16,
    ) -> Result<Config> {
        let mut candidate = self.config().ok_or(DomainError::NotLoaded)?;
        candidate.ip = ip;
        candidate.stream_port = stream_port;
        candidate.control_port = control_port;
        candidate.validate()?;

        self.apply(move |config| {
            config.ip = candidate.ip;
            config.stream_port = candidate.stream_port;
            config.control_port = candidate.control_port;
        })
        .await
    }

    pub async fn update_keyboard_bindings(&self, bindings: KeyboardBindings) -> Result<Config> {
        self.apply(move |config| config.keyboard = bindings).await
    }

    pub async fn update_gamepad_bindings(&self, bindings: GamepadBindings) -> Result<Config> {
        self.apply(move |config| config.gamepad = bindings).await
    }

    async fn apply<F>(&self, update: F) -> Result<Config>
    where
        F: FnOnce(&mut Config),
    {
        let updated = {
            let mut guard = self.config.write();
            let config = guard.as_mut().ok_or(DomainError::NotLoaded)?;
            update(config);
            config.clone()
        };

        self.persist().await;
        Ok(updated)
    }

    async fn persist(&self) {
        let _guard = self.save_lock.lock().await;
        let Some(config) = self.config() else {
            return;
        };

        debug!("Persisting config (drone at {})", config.ip);
        match self.repository.save_config(&config).await {
            Ok(()) => self.notify(ConfigNotification::updated(config)),
            Err(e) => {
                error!("Failed to save config: {}", e);
                counter!("config_save_failures_total").increment(1);
                self.notify(ConfigNotification::save_failed("Failed to save config"));
            }
        }
    }

    fn notify(&self, notification: ConfigNotification) {
        // Ignore send errors (no receivers)
        let _ = self.notifications.send(notification);
    }
}
