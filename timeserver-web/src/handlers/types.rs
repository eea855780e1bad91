//! Request and response bodies

use serde::{Deserialize, Serialize};
use timeserver_auth::{IssuedToken, KeyInfo};
use utoipa::{IntoParams, ToSchema};

/// Configured time zone
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimezoneBody {
    /// IANA time zone name
    #[schema(example = "Europe/Berlin")]
    pub timezone: String,
}

/// Global log level
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogLevelBody {
    /// One of trace, debug, info, warn, error, off
    #[schema(example = "info")]
    pub level: String,
}

/// Optional role downgrade for token issuance
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokenQuery {
    /// Role to put in the token; must not exceed the caller's role
    #[param(example = "config:reader")]
    pub role: Option<String>,
}

/// Issued token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    #[schema(example = "config:reader")]
    pub role: String,
    /// Expiry as unix seconds
    pub expires_at: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            role: issued.role.to_string(),
            expires_at: issued.expires_at.timestamp(),
        }
    }
}

/// API key record as exchanged over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeyRecord {
    /// The API key
    pub id: String,
    #[schema(example = "alice")]
    pub user: String,
    #[schema(example = "config:writer")]
    pub role: String,
}

impl From<KeyInfo> for KeyRecord {
    fn from(info: KeyInfo) -> Self {
        Self {
            id: info.id,
            user: info.user,
            role: info.role.to_string(),
        }
    }
}

/// Confirmation message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "unauthorized")]
    pub error: String,
    pub message: String,
}
