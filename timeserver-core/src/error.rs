//! Unified error handling for process-level failures
//!
//! Configuration, validation and startup errors carry a small context with the
//! originating component and recovery suggestions.

use thiserror::Error;

pub type TimeserverResult<T> = Result<T, TimeserverError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for process-level failures
#[derive(Error, Debug)]
pub enum TimeserverError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Startup error: {message}")]
    Startup {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Logging error: {message}")]
    Logging {
        message: String,
        context: ErrorContext,
    },
}

impl TimeserverError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            TimeserverError::Config { context, .. }
            | TimeserverError::Validation { context, .. }
            | TimeserverError::Startup { context, .. }
            | TimeserverError::Logging { context, .. } => context,
        }
    }

    /// Whether the error means the process cannot start
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TimeserverError::Startup { .. } | TimeserverError::Config { .. }
        )
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::TimeserverError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::TimeserverError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::TimeserverError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! startup_error {
    ($msg:expr, $component:expr) => {
        $crate::TimeserverError::Startup {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::TimeserverError::Startup {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}
