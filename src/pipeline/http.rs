use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Duration;

use crate::common::{trace, Result};
use crate::pipeline::{Method, Request, Response, Transport};

// Client configuration.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    // Identity service base url, endpoint paths are appended to it.
    base_url: Option<String>,
    // Per request timeout enforced by the http client.
    timeout_milliseconds: Option<u64>,
}

impl Config {
    const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:7878/api";
    const DEFAULT_TIMEOUT_MILLISECONDS: u64 = 5000;

    pub fn set_base_url(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.base_url = Some(val)
        }
    }
    pub fn set_timeout_milliseconds(&mut self, val: Option<u64>) {
        if let Some(val) = val {
            self.timeout_milliseconds = Some(std::cmp::max(val, 1));
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut Config) {
        self.set_base_url(&mut other.base_url);
        self.set_timeout_milliseconds(other.timeout_milliseconds);
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(Config::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(
            self.timeout_milliseconds
                .unwrap_or(Config::DEFAULT_TIMEOUT_MILLISECONDS),
        )
    }
}

/// Talks to the identity service over http with json bodies.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_owned(),
        })
    }

    fn url(&self, request: &Request) -> String {
        format!("{}{}", self.base_url, request.endpoint.path())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let url = self.url(&request);
        let mut builder = match request.endpoint.method() {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(token) = request.bearer.as_ref() {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        trace!(%url, status, bytes = body.len(), "Http response");

        Ok(Response::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_overrides() {
        let mut config = Config::default();
        assert_eq!(config.base_url(), "http://127.0.0.1:7878/api");
        assert_eq!(config.timeout(), Duration::from_millis(5000));

        let mut other = Config::default();
        other.set_base_url(&mut Some("http://localhost:9000/api/".to_owned()));
        other.set_timeout_milliseconds(Some(0));
        config.override_merge(&mut other);

        assert_eq!(config.base_url(), "http://localhost:9000/api");
        assert_eq!(config.timeout(), Duration::from_millis(1));
    }

    #[test]
    fn url_joins_endpoint_path() {
        let transport = HttpTransport::new(&Config::default()).unwrap();
        let request = Request::new(crate::pipeline::Endpoint::AdminSecret);
        assert_eq!(transport.url(&request), "http://127.0.0.1:7878/api/admin/secret");
    }
}
