use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{Error, ErrorKind, Result};

// Closed set of roles known to the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Whether a holder of this role satisfies a gate requiring `required`.
    /// Exact match only, there is no role hierarchy.
    pub fn satisfies(&self, required: Role) -> bool {
        *self == required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(Error::from(ErrorKind::InvalidIdentity {
                description: format!("unknown role {}", s),
            })),
        }
    }
}

/// Authenticated user as reported by the identity service.
///
/// Identities are replaced as a whole, never patched field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIdentity")]
pub struct Identity {
    username: String,
    role: Role,
}

#[derive(Deserialize)]
struct RawIdentity {
    username: String,
    role: Role,
}

impl TryFrom<RawIdentity> for Identity {
    type Error = Error;
    fn try_from(raw: RawIdentity) -> Result<Self, Self::Error> {
        Identity::new(raw.username, raw.role)
    }
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Result<Self> {
        let username = username.into();
        if username.is_empty() {
            Err(Error::from(ErrorKind::InvalidIdentity {
                description: "username is empty".to_owned(),
            }))
        } else {
            Ok(Self { username, role })
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Opaque bearer credential. Never inspected, never logged in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(s: impl Into<String>) -> Self {
        Token(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let visible: String = self.0.chars().take(4).collect();
        write!(f, "Token({}***)", visible)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.to_owned())
    }
}
