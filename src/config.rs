//! Configuration loading and management.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity and metrics.
    #[serde(default)]
    pub server: ServerConfig,
    /// HTTP bridge listener.
    #[serde(default)]
    pub http: HttpConfig,
    /// Line gateway listener.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Track library.
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name used in logs.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus endpoint port; 0 disables the endpoint.
    pub metrics_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: None,
        }
    }
}

/// HTTP bridge listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to (e.g., "127.0.0.1:8080").
    #[serde(default = "default_http_address")]
    pub address: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { address: default_http_address() }
    }
}

/// Line gateway listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Address to bind to (e.g., "127.0.0.1:6602").
    #[serde(default = "default_gateway_address")]
    pub address: SocketAddr,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { address: default_gateway_address() }
    }
}

/// Track library configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryConfig {
    /// Path to a JSON library file. Absent means an empty library.
    pub path: Option<PathBuf>,
}

fn default_server_name() -> String {
    "spind".to_string()
}

fn default_http_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_gateway_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6602))
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not
    /// exist. Parse errors in an existing file are still fatal.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "No config file; using defaults");
            Ok(Self::default())
        }
    }
}
