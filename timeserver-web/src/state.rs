//! Application state shared by every handler

use crate::auth::Guard;
use crate::WebResult;
use std::path::Path;
use std::sync::Arc;
use timeserver_auth::{AccessGate, AccessPolicy, FileKeyRegistry, KeyRegistry, TokenIssuer};
use timeserver_core::{LogLevelHandle, TimeZoneCell};
use tracing::info;

/// Process-scoped state, created once at startup
#[derive(Clone)]
pub struct AppState {
    /// Configured time zone
    pub timezone: Arc<TimeZoneCell>,
    /// Global log level
    pub log_level: LogLevelHandle,
    /// API key registry
    pub registry: Arc<dyn KeyRegistry>,
    /// Token signer holding the in-memory signing key
    pub issuer: Arc<TokenIssuer>,
    gate: AccessGate,
}

impl AppState {
    /// Open the file registry under `store` and draw a fresh signing key
    pub async fn new(store: &Path, log_level: LogLevelHandle) -> WebResult<Self> {
        let registry = FileKeyRegistry::open(store).await?;
        let issuer = TokenIssuer::generate()?;

        info!("Application state initialized");
        Ok(Self::with_parts(Arc::new(registry), Arc::new(issuer), log_level))
    }

    /// Assemble state from existing parts
    pub fn with_parts(
        registry: Arc<dyn KeyRegistry>,
        issuer: Arc<TokenIssuer>,
        log_level: LogLevelHandle,
    ) -> Self {
        let gate = AccessGate::new(Arc::clone(&registry), Arc::clone(&issuer));
        Self {
            timezone: Arc::new(TimeZoneCell::new()),
            log_level,
            registry,
            issuer,
            gate,
        }
    }

    /// Guard enforcing `policy` with this state's gate
    pub fn guard(&self, policy: AccessPolicy) -> Guard {
        Guard::new(self.gate.clone(), policy)
    }
}
