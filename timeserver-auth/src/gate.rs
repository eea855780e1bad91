//! Per-request admission decision
//!
//! A request carries at most one credential that counts: a non-empty
//! `X-API-KEY` header selects the API key path, otherwise an
//! `Authorization: Bearer` header selects the token path. Each path resolves
//! the credential to an [`Identity`] and the gate then checks the identity's
//! role against the endpoint's [`AccessPolicy`].

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;
use crate::registry::KeyRegistry;
use crate::role::{Role, RoleSet};
use crate::token::TokenIssuer;
use std::sync::Arc;
use tracing::{debug, error};

/// Header carrying an opaque API key
pub const API_KEY_HEADER: &str = "X-API-KEY";

const BEARER_PREFIX: &str = "Bearer ";

/// The credential selected from a request's headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    ApiKey(&'a str),
    Token(&'a str),
    Missing,
}

impl<'a> Credential<'a> {
    /// Pick the credential from the raw `X-API-KEY` and `Authorization`
    /// header values. The API key wins whenever it is non-empty.
    pub fn select(api_key: Option<&'a str>, authorization: Option<&'a str>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            return Credential::ApiKey(key);
        }
        match authorization.and_then(|value| value.strip_prefix(BEARER_PREFIX)) {
            Some(token) if !token.trim().is_empty() => Credential::Token(token.trim()),
            _ => Credential::Missing,
        }
    }
}

/// Which credential kinds an endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialPaths {
    Any,
    ApiKeyOnly,
}

/// Admission requirements of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    pub roles: RoleSet,
    pub paths: CredentialPaths,
}

impl AccessPolicy {
    pub fn new(roles: RoleSet, paths: CredentialPaths) -> Self {
        Self { roles, paths }
    }

    /// Any granted role
    pub fn readers() -> Self {
        Self::new(RoleSet::at_least(Role::ConfigReader), CredentialPaths::Any)
    }

    pub fn writers() -> Self {
        Self::new(RoleSet::at_least(Role::ConfigWriter), CredentialPaths::Any)
    }

    pub fn admins() -> Self {
        Self::new(RoleSet::of(&[Role::Admin]), CredentialPaths::Any)
    }

    /// Token issuance needs a real API key so the caller's own role bounds
    /// the requested one.
    pub fn token_issuance() -> Self {
        Self::new(
            RoleSet::at_least(Role::ConfigReader),
            CredentialPaths::ApiKeyOnly,
        )
    }
}

/// Decides whether a credential may pass an [`AccessPolicy`]
#[derive(Clone)]
pub struct AccessGate {
    registry: Arc<dyn KeyRegistry>,
    issuer: Arc<TokenIssuer>,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl AccessGate {
    pub fn new(registry: Arc<dyn KeyRegistry>, issuer: Arc<TokenIssuer>) -> Self {
        Self { registry, issuer }
    }

    /// Admit or reject. Every rejection is [`AuthError::Unauthorized`]
    /// carrying a reason meant for logs only.
    pub async fn admit(
        &self,
        credential: Credential<'_>,
        policy: &AccessPolicy,
    ) -> AuthResult<Identity> {
        let result = match (credential, policy.paths) {
            (Credential::ApiKey(key), _) => self.admit_api_key(key, &policy.roles).await,
            (Credential::Token(token), CredentialPaths::Any) => {
                self.admit_token(token, &policy.roles)
            }
            (Credential::Token(_), CredentialPaths::ApiKeyOnly) => Err(AuthError::Unauthorized(
                "endpoint requires an API key".to_string(),
            )),
            (Credential::Missing, _) => {
                Err(AuthError::Unauthorized("no credential presented".to_string()))
            }
        };

        result.map_err(|e| {
            debug!("Request rejected: {}", e);
            match e {
                AuthError::Unauthorized(reason) => AuthError::Unauthorized(reason),
                other => AuthError::Unauthorized(other.to_string()),
            }
        })
    }

    /// API key path. An empty role set admits any registered key.
    pub async fn admit_api_key(&self, key: &str, roles: &RoleSet) -> AuthResult<Identity> {
        let info = match self.registry.get(key).await {
            Ok(Some(info)) => info,
            Ok(None) => return Err(AuthError::Unauthorized("unknown API key".to_string())),
            Err(e) => {
                error!("API key lookup failed: {}", e);
                return Err(AuthError::Unauthorized("API key lookup failed".to_string()));
            }
        };

        if !roles.is_empty() && !roles.contains(info.role) {
            return Err(AuthError::Unauthorized(format!(
                "role {} not permitted",
                info.role
            )));
        }

        debug!("Admitted API key of user {} as {}", info.user, info.role);
        Ok(info.identity())
    }

    /// Token path. Membership is required; an empty role set admits nobody.
    pub fn admit_token(&self, token: &str, roles: &RoleSet) -> AuthResult<Identity> {
        let claims = self.issuer.verify(token)?;

        if !roles.contains(claims.role) {
            return Err(AuthError::Unauthorized(format!(
                "role {} not permitted",
                claims.role
            )));
        }

        debug!("Admitted token of user {} as {}", claims.user, claims.role);
        Ok(claims.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{KeyInfo, MemoryKeyRegistry};
    use async_trait::async_trait;

    async fn gate() -> (AccessGate, Arc<TokenIssuer>) {
        let registry = MemoryKeyRegistry::new();
        for (key, user, role) in [
            ("reader-key", "rita", Role::ConfigReader),
            ("writer-key", "wade", Role::ConfigWriter),
            ("admin-key", "alice", Role::Admin),
        ] {
            registry
                .add(key, &KeyInfo::new(key, user, role))
                .await
                .unwrap();
        }
        let issuer = Arc::new(TokenIssuer::new(b"gate test secret"));
        (
            AccessGate::new(Arc::new(registry), Arc::clone(&issuer)),
            issuer,
        )
    }

    struct BrokenRegistry;

    #[async_trait]
    impl KeyRegistry for BrokenRegistry {
        async fn add(&self, _: &str, _: &KeyInfo) -> AuthResult<()> {
            Err(std::io::Error::other("disk gone").into())
        }
        async fn get(&self, _: &str) -> AuthResult<Option<KeyInfo>> {
            Err(std::io::Error::other("disk gone").into())
        }
        async fn all(&self) -> AuthResult<Vec<KeyInfo>> {
            Err(std::io::Error::other("disk gone").into())
        }
        async fn delete(&self, _: &str) -> AuthResult<bool> {
            Err(std::io::Error::other("disk gone").into())
        }
    }

    #[test]
    fn test_credential_selection() {
        assert_eq!(
            Credential::select(Some("k1"), Some("Bearer abc")),
            Credential::ApiKey("k1")
        );
        assert_eq!(
            Credential::select(Some(""), Some("Bearer abc")),
            Credential::Token("abc")
        );
        assert_eq!(
            Credential::select(None, Some("Bearer abc")),
            Credential::Token("abc")
        );
        assert_eq!(
            Credential::select(None, Some("Basic abc")),
            Credential::Missing
        );
        assert_eq!(Credential::select(None, Some("Bearer ")), Credential::Missing);
        assert_eq!(Credential::select(None, None), Credential::Missing);
    }

    #[tokio::test]
    async fn test_api_key_admitted_by_membership() {
        let (gate, _) = gate().await;

        let identity = gate
            .admit(Credential::ApiKey("admin-key"), &AccessPolicy::admins())
            .await
            .unwrap();
        assert_eq!(identity.user, "alice");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.api_key.as_deref(), Some("admin-key"));

        assert!(gate
            .admit(Credential::ApiKey("writer-key"), &AccessPolicy::writers())
            .await
            .is_ok());
        assert!(gate
            .admit(Credential::ApiKey("reader-key"), &AccessPolicy::readers())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_api_key_outside_set_is_rejected() {
        let (gate, _) = gate().await;

        for (key, policy) in [
            ("reader-key", AccessPolicy::writers()),
            ("reader-key", AccessPolicy::admins()),
            ("writer-key", AccessPolicy::admins()),
        ] {
            let err = gate
                .admit(Credential::ApiKey(key), &policy)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Unauthorized(_)));
        }
    }

    #[tokio::test]
    async fn test_membership_is_exact() {
        let (gate, _) = gate().await;
        let readers_only = AccessPolicy::new(
            RoleSet::of(&[Role::ConfigReader]),
            CredentialPaths::Any,
        );

        assert!(gate
            .admit(Credential::ApiKey("reader-key"), &readers_only)
            .await
            .is_ok());
        assert!(gate
            .admit(Credential::ApiKey("admin-key"), &readers_only)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_api_key_with_empty_set_admits_any_registered_key() {
        let (gate, _) = gate().await;
        let open = AccessPolicy::new(RoleSet::empty(), CredentialPaths::Any);

        assert!(gate
            .admit(Credential::ApiKey("reader-key"), &open)
            .await
            .is_ok());
        assert!(gate
            .admit(Credential::ApiKey("missing"), &open)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_unknown_api_key_is_rejected() {
        let (gate, _) = gate().await;

        let err = gate
            .admit(Credential::ApiKey("nope"), &AccessPolicy::readers())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_registry_failure_is_rejected() {
        let gate = AccessGate::new(
            Arc::new(BrokenRegistry),
            Arc::new(TokenIssuer::new(b"secret")),
        );

        let err = gate
            .admit(Credential::ApiKey("k1"), &AccessPolicy::readers())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_token_admitted_by_membership() {
        let (gate, issuer) = gate().await;
        let issued = issuer
            .issue(&Identity::new("wade", Role::ConfigWriter), None)
            .unwrap();

        let identity = gate
            .admit(Credential::Token(&issued.token), &AccessPolicy::writers())
            .await
            .unwrap();
        assert_eq!(identity, Identity::new("wade", Role::ConfigWriter));

        assert!(gate
            .admit(Credential::Token(&issued.token), &AccessPolicy::admins())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_downgraded_token_loses_access() {
        let (gate, issuer) = gate().await;
        let issued = issuer
            .issue(&Identity::new("alice", Role::Admin), Some(Role::ConfigReader))
            .unwrap();

        assert!(gate
            .admit(Credential::Token(&issued.token), &AccessPolicy::readers())
            .await
            .is_ok());
        assert!(gate
            .admit(Credential::Token(&issued.token), &AccessPolicy::writers())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_token_with_empty_set_is_rejected() {
        let (gate, issuer) = gate().await;
        let issued = issuer
            .issue(&Identity::new("alice", Role::Admin), None)
            .unwrap();
        let open = AccessPolicy::new(RoleSet::empty(), CredentialPaths::Any);

        assert!(gate
            .admit(Credential::Token(&issued.token), &open)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_forged_token_is_rejected() {
        let (gate, _) = gate().await;
        let forged = TokenIssuer::new(b"attacker")
            .issue(&Identity::new("mallory", Role::Admin), None)
            .unwrap();

        let err = gate
            .admit(Credential::Token(&forged.token), &AccessPolicy::readers())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_token_refused_on_api_key_only_endpoint() {
        let (gate, issuer) = gate().await;
        let issued = issuer
            .issue(&Identity::new("alice", Role::Admin), None)
            .unwrap();

        assert!(gate
            .admit(
                Credential::Token(&issued.token),
                &AccessPolicy::token_issuance()
            )
            .await
            .is_err());
        assert!(gate
            .admit(
                Credential::ApiKey("reader-key"),
                &AccessPolicy::token_issuance()
            )
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_missing_credential_is_rejected() {
        let (gate, _) = gate().await;

        assert!(gate
            .admit(Credential::Missing, &AccessPolicy::readers())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_token_outlives_key_deletion() {
        let registry = Arc::new(MemoryKeyRegistry::new());
        registry
            .add("k1", &KeyInfo::new("k1", "alice", Role::Admin))
            .await
            .unwrap();
        let issuer = Arc::new(TokenIssuer::new(b"secret"));
        let gate = AccessGate::new(registry.clone(), Arc::clone(&issuer));

        let identity = gate
            .admit(Credential::ApiKey("k1"), &AccessPolicy::token_issuance())
            .await
            .unwrap();
        let issued = issuer.issue(&identity, None).unwrap();
        registry.delete("k1").await.unwrap();

        assert!(gate
            .admit(Credential::ApiKey("k1"), &AccessPolicy::admins())
            .await
            .is_err());
        assert!(gate
            .admit(Credential::Token(&issued.token), &AccessPolicy::admins())
            .await
            .is_ok());
    }
}
