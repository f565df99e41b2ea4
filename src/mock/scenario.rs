use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{Error, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    Success,
    // Every login is rejected.
    InvalidPassword,
    // Identity fetch reports an expired token.
    TokenExpired,
    // Every call fails with 500.
    ServerError,
    // Protected resource is refused even for admins.
    Forbidden,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Success,
        Scenario::InvalidPassword,
        Scenario::TokenExpired,
        Scenario::ServerError,
        Scenario::Forbidden,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Success => "success",
            Scenario::InvalidPassword => "invalid_password",
            Scenario::TokenExpired => "token_expired",
            Scenario::ServerError => "server_error",
            Scenario::Forbidden => "forbidden",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .iter()
            .find(|scenario| scenario.as_str() == s)
            .copied()
            .ok_or_else(|| {
                Error::from(ErrorKind::InvalidConfig {
                    description: format!("unknown scenario {}", s),
                })
            })
    }
}
