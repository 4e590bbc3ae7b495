//! Binding capture use case
//!
//! Records one controller input for a gamepad binding field and persists it
//! through the config store. Only one capture runs at a time; starting a new
//! one abandons the previous capture the same way a focus change would.

use crate::domain::binding::{
    Binding, BindingCapture, CaptureMode, GamepadSource, SharedGamepadSource,
};
use crate::domain::settings::{Config, ConfigStore, GamepadBindings, GamepadField};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::error::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info};

/// Result of one capture request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CaptureOutcome {
    Captured {
        field: GamepadField,
        binding: Binding,
        label: String,
        config: Config,
    },
    /// Abandoned by a cancel or a newer capture
    Cancelled { field: GamepadField },
}

struct ActiveCapture {
    id: u64,
    cancel: Arc<Notify>,
}

/// Clears the active slot when a capture ends, including when the request
/// future is dropped mid-capture
struct ActiveGuard<'a> {
    active: &'a Mutex<Option<ActiveCapture>>,
    id: u64,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut active = self.active.lock();
        if active.as_ref().map(|a| a.id) == Some(self.id) {
            *active = None;
        }
    }
}

/// Coordinates binding captures against the shared gamepad source
pub struct BindingService {
    store: Arc<ConfigStore>,
    gamepads: Arc<SharedGamepadSource>,
    active: Mutex<Option<ActiveCapture>>,
    next_id: AtomicU64,
}

impl BindingService {
    pub fn new(store: Arc<ConfigStore>, gamepads: Arc<SharedGamepadSource>) -> Self {
        Self {
            store,
            gamepads,
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    fn capture_for(field: GamepadField, config: &Config) -> BindingCapture {
        let mode = if field.is_joystick() {
            CaptureMode::Joystick
        } else {
            CaptureMode::Buttons
        };

        BindingCapture::new(
            mode,
            field.get(&config.gamepad),
            field.get(&GamepadBindings::default()),
        )
    }

    /// Record the next qualifying input for `field` and persist it
    pub async fn capture(&self, field: GamepadField) -> Result<CaptureOutcome> {
        let config = self.store.get_or_load().await?;

        if !self.gamepads.is_connected() {
            return Err(DomainError::InvalidOperation(
                "No gamepad connected".to_string(),
            ));
        }

        let mut capture = Self::capture_for(field, &config);
        let cancel = Arc::new(Notify::new());
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        if let Some(previous) = self.active.lock().replace(ActiveCapture {
            id,
            cancel: Arc::clone(&cancel),
        }) {
            debug!("Capture {} superseded by {}", previous.id, id);
            previous.cancel.notify_one();
        }
        let guard = ActiveGuard {
            active: &self.active,
            id,
        };

        info!("Recording gamepad binding for {}", field);
        let captured = capture
            .record(&*self.gamepads, cancel.notified())
            .await;
        drop(guard);

        let Some(binding) = captured else {
            debug!("Capture for {} abandoned", field);
            return Ok(CaptureOutcome::Cancelled { field });
        };

        let config = self.store_binding(field, binding).await?;
        Ok(CaptureOutcome::Captured {
            field,
            binding,
            label: capture.display_text(),
            config,
        })
    }

    /// Abandon the running capture. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        match self.active.lock().take() {
            Some(active) => {
                active.cancel.notify_one();
                true
            }
            None => false,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Restore the default binding of `field` and persist it
    pub async fn reset_to_default(&self, field: GamepadField) -> Result<Config> {
        let config = self.store.get_or_load().await?;
        let binding = Self::capture_for(field, &config).reset_to_default();
        info!("Resetting {} to {}", field, binding);
        self.store_binding(field, binding).await
    }

    async fn store_binding(&self, field: GamepadField, binding: Binding) -> Result<Config> {
        // Re-read so concurrent edits to other fields are kept
        let mut bindings = self
            .store
            .config()
            .ok_or(DomainError::NotLoaded)?
            .gamepad;
        field.set(&mut bindings, binding)?;
        self.store.update_gamepad_bindings(bindings).await
    }
}
