//! Server-mutable time zone

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::{Mutex, PoisonError};

/// Serializing holder for the configured time zone.
///
/// Starts empty and reports UTC until a zone is set. Lives for the process
/// lifetime and is never persisted.
#[derive(Debug, Default)]
pub struct TimeZoneCell {
    zone: Mutex<Option<Tz>>,
}

impl TimeZoneCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time zone.
    pub fn set(&self, zone: Tz) {
        *self.zone.lock().unwrap_or_else(PoisonError::into_inner) = Some(zone);
    }

    /// Current time zone, UTC if none was set.
    pub fn get(&self) -> Tz {
        self.zone
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or(Tz::UTC)
    }

    /// Current time in the configured zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.get())
    }
}

/// Resolve an IANA time zone name.
pub fn resolve_zone(name: &str) -> Option<Tz> {
    name.parse::<Tz>().ok()
}
