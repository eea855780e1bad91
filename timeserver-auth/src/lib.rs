//! Timeserver authentication and authorization
//!
//! Two credential kinds are accepted: long-lived opaque API keys kept in a
//! persistent [`KeyRegistry`], and short-lived signed tokens minted by the
//! [`TokenIssuer`] for callers that already hold an API key. Both resolve to
//! a [`Role`]; the [`AccessGate`] admits a request when that role is in the
//! endpoint's [`RoleSet`].

pub mod error;
pub mod gate;
pub mod identity;
pub mod registry;
pub mod role;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use gate::{AccessGate, AccessPolicy, Credential, CredentialPaths, API_KEY_HEADER};
pub use identity::Identity;
pub use registry::{resource_name, FileKeyRegistry, KeyInfo, KeyRegistry, MemoryKeyRegistry};
pub use role::{Role, RoleSet};
pub use token::{Claims, IssuedToken, TokenIssuer, TOKEN_LIFETIME_HOURS};
