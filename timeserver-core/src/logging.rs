//! Unified logging system
//!
//! Structured logging with a configurable output format and a global level
//! that can be changed while the server runs.

use crate::error::{ErrorContext, TimeserverError, TimeserverResult};
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error, off)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Per-target filter directives, e.g. `hyper=warn`
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            filter_directives: vec!["hyper=warn".to_string(), "h2=warn".to_string()],
        }
    }
}

/// Parse a textual log level
pub fn parse_level(level: &str) -> TimeserverResult<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        _ => Err(crate::validation_error!(
            format!("unknown log level: {}", level),
            "level",
            "logging"
        )),
    }
}

/// Lowercase name of a level filter
pub fn level_name(level: LevelFilter) -> &'static str {
    if level == LevelFilter::TRACE {
        "trace"
    } else if level == LevelFilter::DEBUG {
        "debug"
    } else if level == LevelFilter::INFO {
        "info"
    } else if level == LevelFilter::WARN {
        "warn"
    } else if level == LevelFilter::ERROR {
        "error"
    } else {
        "off"
    }
}

/// Handle to the process-wide log level.
///
/// Cloning is cheap; all clones observe and change the same level. A handle
/// created with [`LogLevelHandle::detached`] is not wired to a subscriber and
/// only records the level.
#[derive(Clone)]
pub struct LogLevelHandle {
    current: Arc<RwLock<LevelFilter>>,
    reload: Option<reload::Handle<LevelFilter, Registry>>,
}

impl std::fmt::Debug for LogLevelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogLevelHandle")
            .field("level", &level_name(self.level()))
            .field("attached", &self.reload.is_some())
            .finish()
    }
}

impl LogLevelHandle {
    /// Create a handle that is not attached to a subscriber
    pub fn detached(level: LevelFilter) -> Self {
        Self {
            current: Arc::new(RwLock::new(level)),
            reload: None,
        }
    }

    /// Current level
    pub fn level(&self) -> LevelFilter {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the level for every subsequent event
    pub fn set_level(&self, level: LevelFilter) -> TimeserverResult<()> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = &self.reload {
            handle
                .reload(level)
                .map_err(|e| TimeserverError::Logging {
                    message: format!("failed to reload log level: {}", e),
                    context: ErrorContext::new("logging").with_operation("set_level"),
                })?;
        }
        *current = level;
        Ok(())
    }
}

/// Initialize the logging system and return a handle to the global level
pub fn init_logging(config: &LoggingConfig) -> TimeserverResult<LogLevelHandle> {
    let level = parse_level(&config.level)?;
    let (level_layer, reload_handle) = reload::Layer::new(level);

    // The reloadable level is the global threshold; the env filter only
    // narrows individual targets below it.
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .from_env_lossy();
    for directive in &config.filter_directives {
        let directive = directive.parse().map_err(|e| TimeserverError::Config {
            message: format!("invalid filter directive '{}'", directive),
            source: Some(Box::new(e)),
            context: ErrorContext::new("logging")
                .with_operation("parse_directive")
                .with_suggestion("Use target=level syntax, e.g. hyper=warn"),
        })?;
        filter = filter.add_directive(directive);
    }

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread)
            .with_thread_names(config.include_thread)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread)
            .with_thread_names(config.include_thread)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread)
            .with_thread_names(config.include_thread)
            .with_writer(io::stdout)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(level_layer)
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TimeserverError::Logging {
            message: format!("failed to install subscriber: {}", e),
            context: ErrorContext::new("logging").with_operation("init"),
        })?;

    Ok(LogLevelHandle {
        current: Arc::new(RwLock::new(level)),
        reload: Some(reload_handle),
    })
}
