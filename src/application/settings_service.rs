//! Server settings use case
//!
//! Changing the drone address or stream port moves the WHEP endpoint, so the
//! stream is restarted against the new location once the store accepted the
//! change. Updates are serialised so the endpoint always follows the stored
//! config.

use crate::config::Settings;
use crate::domain::settings::{Config, ConfigStore};
use crate::domain::shared::error::Result;
use crate::domain::stream::StreamConnectionManager;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub struct SettingsService {
    store: Arc<ConfigStore>,
    stream: StreamConnectionManager,
    settings: Settings,
    update_lock: Mutex<()>,
}

impl SettingsService {
    pub fn new(store: Arc<ConfigStore>, stream: StreamConnectionManager, settings: Settings) -> Self {
        Self {
            store,
            stream,
            settings,
            update_lock: Mutex::new(()),
        }
    }

    /// Apply new server settings, retargeting the stream if the endpoint moved
    pub async fn update_server_settings(
        &self,
        ip: String,
        stream_port: u16,
        control_port: u16,
    ) -> Result<Config> {
        let _guard = self.update_lock.lock().await;
        let previous = self.store.get_or_load().await?;
        let updated = self
            .store
            .update_server_settings(ip, stream_port, control_port)
            .await?;

        self.follow_endpoint(&previous, &updated);
        Ok(updated)
    }

    /// Replace the whole configuration, retargeting the stream if needed
    pub async fn replace(&self, config: Config) -> Result<Config> {
        let _guard = self.update_lock.lock().await;
        let previous = self.store.config();
        let updated = self.store.replace(config).await?;

        match previous {
            Some(previous) => self.follow_endpoint(&previous, &updated),
            None => self.retarget(&updated),
        }
        Ok(updated)
    }

    fn follow_endpoint(&self, previous: &Config, updated: &Config) {
        if previous.ip != updated.ip || previous.stream_port != updated.stream_port {
            self.retarget(updated);
        }
    }

    fn retarget(&self, config: &Config) {
        let endpoint = self.settings.whep_endpoint(&config.ip, config.stream_port);
        info!("Stream endpoint changed to {}", endpoint);
        self.stream.set_endpoint(endpoint);

        // Restart in the background so the caller is not held up by negotiation
        let stream = self.stream.clone();
        tokio::spawn(async move { stream.start().await });
    }
}
