//! Caller identity attached to admitted requests

use crate::role::Role;

/// Who made a request and with which role.
///
/// `api_key` is set when the request was admitted through the API key path
/// and empty when it came in with a signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub api_key: Option<String>,
    pub user: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user: impl Into<String>, role: Role) -> Self {
        Self {
            api_key: None,
            user: user.into(),
            role,
        }
    }
}
