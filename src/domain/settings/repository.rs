//! Configuration repository interface

use crate::domain::settings::model::Config;
use crate::domain::shared::error::Result;
use async_trait::async_trait;

/// Host-side persistence of the operator configuration.
///
/// This is the `get_config` / `save_config` bridge; the storage behind it is
/// up to the implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Load the persisted configuration
    async fn get_config(&self) -> Result<Config>;

    /// Persist the configuration, replacing what was stored
    async fn save_config(&self, config: &Config) -> Result<()>;
}
