//! HTTP request handlers for the timeserver

pub mod keys;
pub mod log_level;
pub mod time;
pub mod timezone;
pub mod token;
pub mod types;

pub use keys::*;
pub use log_level::*;
pub use time::*;
pub use timezone::*;
pub use token::*;

pub use types::*;
