//! Staff roles and the admission policy applied on every identity sync.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_REPRESENTATIVE: &str = "representative";
pub const ROLE_PENDING: &str = "pending";

/// Display name used when neither the identity nor the store provides one and
/// there is no email to derive it from.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Role held by a staff account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Representative,
    /// Registered but not yet approved by an admin.
    Pending,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Staff => ROLE_STAFF,
            Role::Representative => ROLE_REPRESENTATIVE,
            Role::Pending => ROLE_PENDING,
        }
    }

    /// Roles an admin may assign explicitly. `pending` is only ever granted by
    /// the admission policy.
    pub const fn is_assignable(self) -> bool {
        !matches!(self, Role::Pending)
    }

    /// Parse a role supplied by an admin for a role change.
    pub fn parse_assignable(value: &str) -> Result<Role, CoreError> {
        match value.parse::<Role>() {
            Ok(role) if role.is_assignable() => Ok(role),
            _ => Err(CoreError::Validation("Invalid role".into())),
        }
    }

    /// Capitalized form used in notification copy (`"Representative"`).
    pub fn title(self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_STAFF => Ok(Role::Staff),
            ROLE_REPRESENTATIVE => Ok(Role::Representative),
            ROLE_PENDING => Ok(Role::Pending),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Outcome of the admission policy for one verified identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First account ever synced; granted `admin` unconditionally.
    Bootstrap,
    /// Known account; its stored role is kept.
    Returning(Role),
    /// New account in a populated store; waits for manual promotion.
    AwaitingApproval,
}

impl Admission {
    pub const fn role(self) -> Role {
        match self {
            Admission::Bootstrap => Role::Admin,
            Admission::Returning(role) => role,
            Admission::AwaitingApproval => Role::Pending,
        }
    }

    /// Whether the admin and the new identity must be told about a pending
    /// registration.
    pub const fn notifies_registration(self) -> bool {
        matches!(self, Admission::AwaitingApproval)
    }
}

/// Decide the role for an identity being synced.
pub fn admit(store_is_empty: bool, existing_role: Option<Role>) -> Admission {
    if store_is_empty {
        return Admission::Bootstrap;
    }
    match existing_role {
        Some(role) => Admission::Returning(role),
        None => Admission::AwaitingApproval,
    }
}

/// Pick the display name to store: provided name, then stored name, then the
/// capitalized local part of the email.
pub fn resolve_display_name(
    provided: Option<&str>,
    stored: Option<&str>,
    email: Option<&str>,
) -> String {
    let non_blank = |s: &&str| !s.trim().is_empty();

    if let Some(name) = provided.filter(non_blank) {
        return name.to_string();
    }
    if let Some(name) = stored.filter(non_blank) {
        return name.to_string();
    }
    email
        .and_then(|e| e.split('@').next())
        .filter(non_blank)
        .map(capitalize)
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
