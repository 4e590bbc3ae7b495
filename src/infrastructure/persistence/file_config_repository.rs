//! TOML file implementation of ConfigRepository

use crate::domain::settings::model::Config;
use crate::domain::settings::repository::ConfigRepository;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::error::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stores the operator configuration in a single TOML file
pub struct FileConfigRepository {
    path: PathBuf,
    /// Held across write and rename so saves land in call order
    write_lock: Mutex<()>,
}

impl FileConfigRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "config.toml".into());
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }
}

fn persistence_error(context: &str, path: &Path, e: impl std::fmt::Display) -> DomainError {
    DomainError::Persistence(format!("{} {}: {}", context, path.display(), e))
}

async fn discard(temp: &Path) {
    if let Err(e) = fs::remove_file(temp).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", temp.display(), e);
        }
    }
}

#[async_trait]
impl ConfigRepository for FileConfigRepository {
    async fn get_config(&self) -> Result<Config> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(persistence_error("Failed to read", &self.path, e)),
        };

        toml::from_str(&content).map_err(|e| persistence_error("Failed to parse", &self.path, e))
    }

    async fn save_config(&self, config: &Config) -> Result<()> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| persistence_error("Failed to serialize", &self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence_error("Failed to create directory for", &self.path, e))?;
        }

        // Write then rename so a crash never leaves a truncated file behind
        let _guard = self.write_lock.lock().await;
        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, content).await {
            discard(&temp).await;
            return Err(persistence_error("Failed to write", &temp, e));
        }
        if let Err(e) = fs::rename(&temp, &self.path).await {
            discard(&temp).await;
            return Err(persistence_error("Failed to replace", &self.path, e));
        }

        debug!("Saved config to {}", self.path.display());
        Ok(())
    }
}
