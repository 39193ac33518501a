use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pool::PoolConfig;
use crate::tcp::TcpConnectorConfig;

/// Errors loading a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid toml or json for [`ClientConfig`].
    #[error("failed to parse config {}: {reason}", .path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Neither `.toml` nor `.json`.
    #[error("unsupported config file extension: {0}")]
    UnsupportedExtension(String),
}

/// Client settings. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the metadata master.
    pub master_address: String,
    /// Master client pool settings.
    pub pool: PoolConfig,
    /// Directory backing the local tier stream factory.
    pub local_tier_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            master_address: String::from("localhost:19998"),
            pool: PoolConfig::default(),
            local_tier_dir: PathBuf::from("/var/lib/tierfs/tier"),
        }
    }
}

impl ClientConfig {
    /// Loads a toml or json config, chosen by file extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let parse_err = |reason: String| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        };
        match ext.to_lowercase().as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| parse_err(e.to_string())),
            "json" => serde_json::from_str(&contents).map_err(|e| parse_err(e.to_string())),
            _ => Err(ConfigError::UnsupportedExtension(ext.to_string())),
        }
    }

    /// TCP settings derived from the pool timeouts.
    pub fn connector_config(&self) -> TcpConnectorConfig {
        TcpConnectorConfig {
            connect_timeout_ms: self.pool.connect_timeout_ms,
            io_timeout_ms: self.pool.io_timeout_ms,
            ..TcpConnectorConfig::default()
        }
    }
}
