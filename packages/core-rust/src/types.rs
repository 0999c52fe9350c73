use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role assigned to an authenticated user.
///
/// Serializes as `snake_case` strings (`"super_admin"`, `"admin"`, `"user"`)
/// so the same spelling is used in JWT claims and in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Operator with access across all tenants.
    SuperAdmin,
    /// Administrator within a tenant.
    Admin,
    /// Regular authenticated user.
    User,
}

impl UserRole {
    /// Every known role, in privilege order (highest first).
    pub const ALL: [UserRole; 3] = [UserRole::SuperAdmin, UserRole::Admin, UserRole::User];

    /// Returns the wire spelling of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a role name that is not a [`UserRole`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier for the authenticated entity.
    pub id: String,
    /// Roles assigned to this principal for authorization checks.
    pub roles: Vec<UserRole>,
    /// Tenant the principal is bound to, if the token carries one.
    pub tenant_id: Option<String>,
}

impl Principal {
    /// Returns `true` if the principal holds at least one of `allowed`.
    #[must_use]
    pub fn has_any_role(&self, allowed: &[UserRole]) -> bool {
        self.roles.iter().any(|role| allowed.contains(role))
    }
}
