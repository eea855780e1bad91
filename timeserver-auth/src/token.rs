//! Signed, time-bounded access tokens (HS256 JWT)

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;
use crate::role::Role;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Lifetime of every issued token
pub const TOKEN_LIFETIME_HOURS: i64 = 6;

const SIGNING_KEY_LEN: usize = 32;

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Temporal and semantic checks. A verified signature over an empty user
    /// or the zero role is still rejected.
    pub fn validate(&self, now: i64) -> AuthResult<()> {
        if now > self.exp {
            return Err(AuthError::InvalidClaim("exp"));
        }
        if self.iat > now {
            return Err(AuthError::InvalidClaim("iat"));
        }
        if self.user.is_empty() {
            return Err(AuthError::InvalidClaim("user"));
        }
        if self.role == Role::Unknown {
            return Err(AuthError::InvalidClaim("role"));
        }
        Ok(())
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.user.clone(), self.role)
    }
}

/// Result of a successful issuance
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub role: Role,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies tokens with a process-wide symmetric key.
///
/// The key lives only in memory; a restart invalidates every outstanding
/// token.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked together with the other claims in `Claims::validate`.
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
        }
    }

    /// Create an issuer with a fresh random signing key from the OS
    pub fn generate() -> AuthResult<Self> {
        let mut secret = [0u8; SIGNING_KEY_LEN];
        OsRng
            .try_fill_bytes(&mut secret)
            .map_err(AuthError::KeyGeneration)?;
        Ok(Self::new(&secret))
    }

    /// Issue a token for an already admitted identity.
    ///
    /// Without `requested` the token carries the identity's own role.
    /// Requesting a role above the identity's role is refused; any role at
    /// or below it is granted.
    pub fn issue(&self, identity: &Identity, requested: Option<Role>) -> AuthResult<IssuedToken> {
        self.issue_at(identity, requested, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        requested: Option<Role>,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let role = match requested {
            Some(requested) if requested > identity.role => {
                return Err(AuthError::PrivilegeEscalation {
                    requested,
                    held: identity.role,
                });
            }
            Some(requested) => requested,
            None => identity.role,
        };

        let expires_at = now + self.lifetime;
        let claims = Claims {
            user: identity.user.clone(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenCreation)?;

        debug!("Issued token for user {} with role {}", claims.user, role);
        Ok(IssuedToken {
            token,
            role,
            expires_at,
        })
    }

    /// Verify signature and claims of `token`
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        data.claims.validate(now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"0123456789abcdef0123456789abcdef")
    }

    fn claims(user: &str, role: Role) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            user: user.to_string(),
            role,
            iat: now,
            exp: now + 60,
        }
    }

    #[test]
    fn test_issue_without_request_uses_own_role() {
        let identity = Identity::new("alice", Role::Admin);
        let now = Utc::now();

        let issued = issuer().issue_at(&identity, None, now).unwrap();

        assert_eq!(issued.role, Role::Admin);
        assert_eq!(
            issued.expires_at.timestamp(),
            now.timestamp() + TOKEN_LIFETIME_HOURS * 3600
        );
    }

    #[test]
    fn test_issue_fails_iff_requested_exceeds_held() {
        let issuer = issuer();
        for held in Role::GRANTABLE {
            let identity = Identity::new("alice", held);
            for requested in Role::GRANTABLE {
                let result = issuer.issue(&identity, Some(requested));
                if requested > held {
                    assert!(matches!(
                        result,
                        Err(AuthError::PrivilegeEscalation { .. })
                    ));
                } else {
                    assert_eq!(result.unwrap().role, requested);
                }
            }
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let issuer = issuer();
        let identity = Identity::new("alice", Role::ConfigWriter);

        let issued = issuer
            .issue(&identity, Some(Role::ConfigReader))
            .unwrap();
        let claims = issuer.verify(&issued.token).unwrap();

        assert_eq!(claims.user, "alice");
        assert_eq!(claims.role, Role::ConfigReader);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_HOURS * 3600);
    }

    #[test]
    fn test_token_from_other_key_is_rejected() {
        let identity = Identity::new("alice", Role::Admin);
        let issued = issuer().issue(&identity, None).unwrap();

        let other = TokenIssuer::new(b"another secret of thirty-two b!!");
        assert!(matches!(
            other.verify(&issued.token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        let identity = Identity::new("alice", Role::Admin);
        let first = TokenIssuer::generate().unwrap();
        let second = TokenIssuer::generate().unwrap();

        let issued = first.issue(&identity, None).unwrap();
        assert!(first.verify(&issued.token).is_ok());
        assert!(second.verify(&issued.token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(
            issuer().verify("not.a.token"),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(issuer().verify("").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = issuer();
        let identity = Identity::new("alice", Role::Admin);
        let issued_at = Utc::now() - Duration::hours(TOKEN_LIFETIME_HOURS + 1);

        let issued = issuer.issue_at(&identity, None, issued_at).unwrap();

        assert!(matches!(
            issuer.verify(&issued.token),
            Err(AuthError::InvalidClaim("exp"))
        ));
    }

    #[test]
    fn test_token_is_valid_through_its_expiry_second() {
        let claims = claims("alice", Role::Admin);

        assert!(claims.validate(claims.exp).is_ok());
        assert!(matches!(
            claims.validate(claims.exp + 1),
            Err(AuthError::InvalidClaim("exp"))
        ));
    }

    #[test]
    fn test_token_issued_in_future_is_rejected() {
        let issuer = issuer();
        let identity = Identity::new("alice", Role::Admin);
        let issued = issuer
            .issue_at(&identity, None, Utc::now() + Duration::minutes(5))
            .unwrap();

        assert!(matches!(
            issuer.verify(&issued.token),
            Err(AuthError::InvalidClaim("iat"))
        ));
    }

    #[test]
    fn test_empty_claims_are_invalid_regardless_of_expiry() {
        let now = Utc::now().timestamp();

        assert!(claims("alice", Role::Admin).validate(now).is_ok());
        assert!(matches!(
            claims("", Role::Admin).validate(now),
            Err(AuthError::InvalidClaim("user"))
        ));
        assert!(matches!(
            claims("alice", Role::Unknown).validate(now),
            Err(AuthError::InvalidClaim("role"))
        ));
    }

    #[test]
    fn test_signed_empty_user_is_rejected() {
        let issuer = issuer();
        let identity = Identity::new("", Role::ConfigReader);
        let issued = issuer.issue(&identity, None).unwrap();

        assert!(matches!(
            issuer.verify(&issued.token),
            Err(AuthError::InvalidClaim("user"))
        ));
    }

    #[test]
    fn test_signed_unknown_role_is_rejected() {
        let issuer = issuer();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims("alice", Role::Unknown),
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .unwrap();

        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_payload_field_names() {
        let json = serde_json::to_value(claims("alice", Role::ConfigWriter)).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object["user"], "alice");
        assert_eq!(object["role"], "config:writer");
        assert!(object.contains_key("iat"));
        assert!(object.contains_key("exp"));
    }
}
