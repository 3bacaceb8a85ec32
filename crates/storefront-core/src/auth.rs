use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Role stored in an account's `user_metadata.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Customer => write!(f, "customer"),
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// The caller behind a validated bearer token.
///
/// `user` is the identity provider's user object, kept verbatim so the
/// profile endpoint can echo it back.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub user: serde_json::Value,
}

impl Identity {
    /// Returns `true` when `required` is empty or contains the caller's role.
    ///
    /// A caller with no recognised role only passes an empty requirement.
    #[must_use]
    pub fn satisfies(&self, required: &[Role]) -> bool {
        if required.is_empty() {
            return true;
        }
        self.role.is_some_and(|role| required.contains(&role))
    }
}

/// Renders a role allow-list as `"admin, customer"`.
#[must_use]
pub fn describe_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Option<Role>) -> Identity {
        Identity {
            id: Uuid::nil(),
            email: Some("shopper@example.com".to_string()),
            role,
            user: serde_json::json!({}),
        }
    }

    #[test]
    fn role_parses_known_values() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("customer".parse::<Role>(), Ok(Role::Customer));
    }

    #[test]
    fn role_rejects_unknown_values() {
        assert_eq!(
            "Admin".parse::<Role>(),
            Err(CoreError::UnknownRole("Admin".to_string()))
        );
    }

    #[test]
    fn empty_requirement_allows_any_caller() {
        assert!(identity(None).satisfies(&[]));
        assert!(identity(Some(Role::Customer)).satisfies(&[]));
    }

    #[test]
    fn role_requirement_checks_membership() {
        assert!(identity(Some(Role::Admin)).satisfies(&[Role::Admin]));
        assert!(!identity(Some(Role::Customer)).satisfies(&[Role::Admin]));
        assert!(identity(Some(Role::Customer)).satisfies(&[Role::Admin, Role::Customer]));
    }

    #[test]
    fn missing_role_fails_any_requirement() {
        assert!(!identity(None).satisfies(&[Role::Customer]));
    }

    #[test]
    fn describe_roles_joins_with_commas() {
        assert_eq!(describe_roles(&[Role::Admin]), "admin");
        assert_eq!(describe_roles(&[Role::Admin, Role::Customer]), "admin, customer");
    }
}
