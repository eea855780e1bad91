//! Role model

use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of an API key or token holder, ordered by privilege.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Zero value; never produced by parsing.
    #[default]
    Unknown = 0,
    ConfigReader = 1,
    ConfigWriter = 2,
    Admin = 3,
}

impl Role {
    /// Every role that can be granted, lowest privilege first
    pub const GRANTABLE: [Role; 3] = [Role::ConfigReader, Role::ConfigWriter, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ConfigReader => "config:reader",
            Role::ConfigWriter => "config:writer",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config:reader" => Ok(Role::ConfigReader),
            "config:writer" => Ok(Role::ConfigWriter),
            "admin" => Ok(Role::Admin),
            _ => Err(AuthError::UnknownRole(s.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = AuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Explicit allow-list of roles for an endpoint.
///
/// Gating is by membership, not by ordering: a hierarchy is expressed by
/// listing every role at or above the minimum, see [`RoleSet::at_least`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    pub fn of(roles: &[Role]) -> Self {
        Self(roles.to_vec())
    }

    /// Every grantable role at or above `minimum`
    pub fn at_least(minimum: Role) -> Self {
        Self(
            Role::GRANTABLE
                .into_iter()
                .filter(|role| *role >= minimum)
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_round_trip() {
        for text in ["config:reader", "config:writer", "admin"] {
            let role: Role = text.parse().unwrap();
            assert_eq!(role.to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_text() {
        for text in ["unknown", "", "Admin", "config:admin", " admin"] {
            let err = text.parse::<Role>().unwrap_err();
            assert_eq!(err.to_string(), format!("unknown role: {}", text));
        }
    }

    #[test]
    fn test_ordering_follows_privilege() {
        assert!(Role::Unknown < Role::ConfigReader);
        assert!(Role::ConfigReader < Role::ConfigWriter);
        assert!(Role::ConfigWriter < Role::Admin);
        assert_eq!(Role::default(), Role::Unknown);
        assert_eq!(Role::Admin as u8, 3);
    }

    #[test]
    fn test_serde_uses_text_form() {
        let json = serde_json::to_string(&Role::ConfigWriter).unwrap();
        assert_eq!(json, "\"config:writer\"");

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);

        assert!(serde_json::from_str::<Role>("\"unknown\"").is_err());
        assert!(serde_json::from_str::<Role>("2").is_err());
    }

    #[test]
    fn test_role_set_at_least() {
        assert_eq!(
            RoleSet::at_least(Role::ConfigReader),
            RoleSet::of(&[Role::ConfigReader, Role::ConfigWriter, Role::Admin])
        );
        assert_eq!(
            RoleSet::at_least(Role::ConfigWriter),
            RoleSet::of(&[Role::ConfigWriter, Role::Admin])
        );
        assert_eq!(RoleSet::at_least(Role::Admin), RoleSet::of(&[Role::Admin]));
        assert!(!RoleSet::at_least(Role::ConfigReader).contains(Role::Unknown));
    }

    #[test]
    fn test_role_set_is_membership_only() {
        let set = RoleSet::of(&[Role::ConfigReader]);
        assert!(set.contains(Role::ConfigReader));
        assert!(!set.contains(Role::Admin));
        assert!(RoleSet::empty().is_empty());
    }
}
