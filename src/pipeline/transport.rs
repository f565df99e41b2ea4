use std::fmt;

use async_trait::async_trait;

use crate::common::Result;
use crate::session::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

// The three operations exposed by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Me,
    AdminSecret,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "/login",
            Endpoint::Me => "/me",
            Endpoint::AdminSecret => "/admin/secret",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Login => Method::Post,
            Endpoint::Me | Endpoint::AdminSecret => Method::Get,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub endpoint: Endpoint,
    pub bearer: Option<Token>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: Option<&Token>) -> Self {
        self.bearer = token.cloned();
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

// Raw status and body as returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves a request to the identity service and returns whatever came back.
///
/// Implementations report only transport level problems as errors; every
/// status code, including 4xx and 5xx, is a successful `Response`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}
