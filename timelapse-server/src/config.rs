use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use timelapse_core::NetworkConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("[network] must set exactly one of `document` or `gtfs_dirs`")]
    NetworkSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Default tracing filter, `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    pub network: NetworkSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSection {
    /// Prebuilt network document
    pub document: Option<PathBuf>,
    /// GTFS feeds to build the network from at startup
    #[serde(default)]
    pub gtfs_dirs: Vec<PathBuf>,
    #[serde(default = "default_coalesce")]
    pub coalesce: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkSource {
    Document(PathBuf),
    Gtfs(NetworkConfig),
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_concurrent_requests() -> usize {
    64
}

fn default_coalesce() -> bool {
    true
}

impl ServerConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.network.source()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl NetworkSection {
    pub fn source(&self) -> Result<NetworkSource, ConfigError> {
        match (&self.document, self.gtfs_dirs.is_empty()) {
            (Some(document), true) => Ok(NetworkSource::Document(document.clone())),
            (None, false) => Ok(NetworkSource::Gtfs(NetworkConfig {
                gtfs_dirs: self.gtfs_dirs.clone(),
                coalesce: self.coalesce,
            })),
            _ => Err(ConfigError::NetworkSource),
        }
    }
}
