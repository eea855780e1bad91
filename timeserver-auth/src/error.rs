//! Authentication and registry errors

use crate::role::Role;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// Credential missing, unknown or lacking the required role. The reason
    /// is for logs only.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid claim: {0}")]
    InvalidClaim(&'static str),

    #[error("requested role {requested} exceeds held role {held}")]
    PrivilegeEscalation { requested: Role, held: Role },

    #[error("token creation failed: {0}")]
    TokenCreation(#[source] jsonwebtoken::errors::Error),

    #[error("signing key generation failed: {0}")]
    KeyGeneration(#[source] rand::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("corrupt record {resource}: {source}")]
    CorruptRecord {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthError {
    /// Whether the error must be reported as a plain authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthorized(_)
                | AuthError::InvalidToken(_)
                | AuthError::InvalidClaim(_)
                | AuthError::PrivilegeEscalation { .. }
        )
    }

    /// Whether the error stems from caller input
    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::UnknownRole(_) | AuthError::Invalid { .. })
    }
}
