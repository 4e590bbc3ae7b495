//! Application settings
//!
//! Built-in defaults, overridden by an optional `cyberfish.toml`, overridden
//! by `CYBERFISH__SECTION__KEY` environment variables.

use crate::domain::shared::value_objects::WhepEndpoint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "cyberfish.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CYBERFISH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub stream: StreamSettings,
    pub logging: LoggingSettings,
}

/// Local HTTP/WebSocket bridge the UI talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Where the operator configuration is persisted
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSettings {
    pub retry_delay_ms: u64,
    pub whep_path: String,
    pub ice_servers: Vec<String>,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                host: "127.0.0.1".to_string(),
                port: 7420,
            },
            storage: StorageSettings {
                config_path: default_config_path(),
            },
            stream: StreamSettings {
                retry_delay_ms: 5000,
                whep_path: WhepEndpoint::DEFAULT_PATH.to_string(),
                ice_servers: vec!["stun:stun.l.google.com:19302".to_string()],
                request_timeout_ms: 10_000,
            },
            logging: LoggingSettings {
                filter: "cyberfish=info,tower_http=info".to_string(),
            },
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cyberfish")
        .join("config.toml")
}

impl Settings {
    /// Load from `cyberfish.toml` in the working directory and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_SETTINGS_FILE)
    }

    /// Load from the given settings file, which may be absent
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(path.as_ref())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("stream.ice_servers")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.stream.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.stream.request_timeout_ms)
    }

    /// WHEP endpoint of the drone at `ip:stream_port`
    pub fn whep_endpoint(&self, ip: &str, stream_port: u16) -> WhepEndpoint {
        WhepEndpoint::new(ip, stream_port, self.stream.whep_path.clone())
    }
}
