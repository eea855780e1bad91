//! Server configuration

use crate::error::{ErrorContext, TimeserverError, TimeserverResult};
use crate::logging::{parse_level, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8081";
/// Default API key store location
pub const DEFAULT_STORE: &str = ".timeserver/store";

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to serve on
    pub addr: String,
    /// Root directory of the API key store
    pub store: PathBuf,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            store: PathBuf::from(DEFAULT_STORE),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> TimeserverResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TimeserverError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        toml::from_str(&content).map_err(|e| TimeserverError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Apply `TIMESERVER_*` environment overrides
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = lookup("TIMESERVER_ADDR") {
            self.addr = addr;
        }
        if let Some(store) = lookup("TIMESERVER_STORE") {
            self.store = PathBuf::from(store);
        }
        if let Some(level) = lookup("TIMESERVER_LOG_LEVEL") {
            self.logging.level = level;
        }
        self
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> TimeserverResult<SocketAddr> {
        let addr = self.addr.replacen("localhost", "127.0.0.1", 1);
        addr.parse().map_err(|e| TimeserverError::Config {
            message: format!("Invalid listen address '{}'", self.addr),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_addr")
                .with_suggestion("Use host:port, e.g. 127.0.0.1:8081"),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> TimeserverResult<()> {
        self.socket_addr()?;

        if self.store.as_os_str().is_empty() {
            return Err(crate::config_error!("Store path must not be empty", "config"));
        }

        parse_level(&self.logging.level)?;
        Ok(())
    }
}
