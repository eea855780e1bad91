//! Timeserver Web Server
//!
//! Server startup and shutdown using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use std::path::PathBuf;
use timeserver_core::{parse_level, startup_error, LogLevelHandle, ServerConfig};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Main timeserver
pub struct TimeServer {
    config: ServerConfig,
    state: AppState,
}

impl TimeServer {
    /// Create the server: validates the configuration, opens the key store
    /// and draws the token signing key.
    pub async fn new(config: ServerConfig, log_level: LogLevelHandle) -> WebResult<Self> {
        config.validate()?;
        let state = AppState::new(&config.store, log_level)
            .await
            .map_err(|e| {
                startup_error!(format!("cannot initialize server state: {}", e), "server")
            })?;

        Ok(Self { config, state })
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.socket_addr()?;

        info!("Starting timeserver");
        info!("API key store: {}", self.config.store.display());

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(address).await.map_err(|e| {
            WebError::Core(startup_error!(
                format!("cannot listen on {}", address),
                "server",
                e
            ))
        })?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for TimeServer
pub struct TimeServerBuilder {
    config: ServerConfig,
    log_level: Option<LogLevelHandle>,
}

impl TimeServerBuilder {
    /// Create a new server builder with default configuration
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Start from an existing configuration
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            config,
            log_level: None,
        }
    }

    /// Set the listen address
    pub fn addr<S: Into<String>>(mut self, addr: S) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the API key store directory
    pub fn store<P: Into<PathBuf>>(mut self, store: P) -> Self {
        self.config.store = store.into();
        self
    }

    /// Use the handle returned by logging initialization
    pub fn log_level(mut self, handle: LogLevelHandle) -> Self {
        self.log_level = Some(handle);
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<TimeServer> {
        let log_level = match self.log_level {
            Some(handle) => handle,
            None => LogLevelHandle::detached(parse_level(&self.config.logging.level)?),
        };
        TimeServer::new(self.config, log_level).await
    }
}

impl Default for TimeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
