//! Timeserver Core - shared building blocks
//!
//! Error types, logging setup, server configuration and the mutable
//! time-zone cell used by every other crate in the workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod timezone;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use timezone::*;

// Re-export commonly used external types
pub use chrono_tz::Tz;
pub use tracing;
