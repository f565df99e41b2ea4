use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::common::warn;
use crate::pipeline::Response;

pub type Outcome<T> = std::result::Result<T, Failure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    // Missing or rejected credential.
    Unauthenticated,
    // Credential was valid once but the session is over.
    Expired,
    // Authenticated but not allowed.
    Forbidden,
    // 5xx, unexpected status, undecodable body or transport failure.
    ServerError,
}

impl FailureKind {
    pub fn default_message(&self) -> &'static str {
        match self {
            FailureKind::Unauthenticated => "Unauthorized",
            FailureKind::Expired => "Session expired",
            FailureKind::Forbidden => "Forbidden",
            FailureKind::ServerError => "Server error",
        }
    }

    /// Failures that end the session rather than offering a retry.
    pub fn ends_session(&self) -> bool {
        matches!(self, FailureKind::Unauthenticated | FailureKind::Expired)
    }
}

/// Classified failure carrying a message fit for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FailureKind,
    message: String,
}

impl Failure {
    /// Use the server supplied message when there is one, the category default otherwise.
    pub fn new(kind: FailureKind, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| kind.default_message().to_owned());
        Self { kind, message }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn server_error() -> Self {
        Failure::new(FailureKind::ServerError, None)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

// Error payload of the identity service. `code` is optional, older services
// only send `message`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

const EXPIRED_CODE: &str = "token_expired";

impl ErrorBody {
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn signals_expiry(&self) -> bool {
        if self.code.as_deref() == Some(EXPIRED_CODE) {
            return true;
        }
        self.message
            .as_deref()
            .map(|m| m.to_lowercase().contains("expired"))
            .unwrap_or(false)
    }
}

/// Map a raw response onto exactly one success payload or failure kind.
pub fn classify<T: DeserializeOwned>(response: &Response) -> Outcome<T> {
    if response.is_success() {
        return serde_json::from_slice::<T>(&response.body).map_err(|err| {
            warn!(%err, "Undecodable success payload");
            Failure::server_error()
        });
    }

    let body = ErrorBody::parse(&response.body);
    let kind = match response.status {
        401 if body.signals_expiry() => FailureKind::Expired,
        401 => FailureKind::Unauthenticated,
        403 => FailureKind::Forbidden,
        _ => FailureKind::ServerError,
    };

    Err(Failure::new(kind, body.message))
}
