use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing_futures::Instrument;

use crate::common::{debug, warn};
use crate::pipeline::{classify, Endpoint, Failure, Outcome, Request, Transport};
use crate::session::{Identity, Token};

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Successful credential exchange: token and identity arrive together.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginGrant {
    #[serde(rename = "accessToken", alias = "token")]
    access_token: String,
    #[serde(alias = "identity")]
    user: Identity,
}

impl LoginGrant {
    pub fn into_parts(self) -> (Token, Identity) {
        (Token::new(self.access_token), self.user)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProtectedResource {
    pub secret: String,
}

/// Attaches credentials to outbound calls and classifies what comes back.
///
/// The pipeline never touches the session; callers decide what a failure means.
#[derive(Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
}

impl RequestPipeline {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a token. Never carries a bearer.
    pub async fn login(&self, credentials: &Credentials) -> Outcome<LoginGrant> {
        let body = match serde_json::to_value(credentials) {
            Ok(body) => body,
            Err(err) => {
                warn!(%err, "Encode credentials");
                return Err(Failure::server_error());
            }
        };
        self.call(Request::new(Endpoint::Login).with_body(body))
            .await
    }

    pub async fn fetch_identity(&self, token: Option<&Token>) -> Outcome<Identity> {
        self.call(Request::new(Endpoint::Me).with_bearer(token))
            .await
    }

    pub async fn fetch_protected(&self, token: Option<&Token>) -> Outcome<ProtectedResource> {
        self.call(Request::new(Endpoint::AdminSecret).with_bearer(token))
            .await
    }

    async fn call<T: DeserializeOwned>(&self, request: Request) -> Outcome<T> {
        let endpoint = request.endpoint;
        let span = tracing::debug_span!("request", %endpoint, bearer = request.bearer.is_some());

        async move {
            let response = match self.transport.send(request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(%err, "Transport failure");
                    return Err(Failure::server_error());
                }
            };

            let outcome = classify::<T>(&response);
            match &outcome {
                Ok(_) => debug!(status = response.status, "Success"),
                Err(failure) => {
                    debug!(status = response.status, kind = ?failure.kind(), message = failure.message(), "Failure")
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockIdentityService, Scenario};
    use crate::pipeline::FailureKind;
    use crate::session::Role;

    fn pipeline() -> (Arc<MockIdentityService>, RequestPipeline) {
        let mock = Arc::new(MockIdentityService::new());
        (mock.clone(), RequestPipeline::new(mock))
    }

    #[tokio::test]
    async fn login_then_fetch_identity() {
        let (mock, pipeline) = pipeline();

        let (token, identity) = pipeline
            .login(&Credentials::new("admin", "admin123"))
            .await
            .unwrap()
            .into_parts();
        assert_eq!(token, Token::new("fake.jwt.token.admin"));
        assert_eq!(identity.role(), Role::Admin);

        let fetched = pipeline.fetch_identity(Some(&token)).await.unwrap();
        assert_eq!(fetched, identity);

        let requests = mock.received();
        assert_eq!(requests[0].endpoint, Endpoint::Login);
        assert!(requests[0].bearer.is_none());
        assert_eq!(requests[1].bearer.as_ref(), Some(&token));
    }

    #[tokio::test]
    async fn invalid_credentials() {
        let (_, pipeline) = pipeline();
        let failure = pipeline
            .login(&Credentials::new("admin", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Unauthenticated);
        assert_eq!(failure.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn missing_token_is_unauthenticated() {
        let (_, pipeline) = pipeline();
        let failure = pipeline.fetch_identity(None).await.unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Unauthenticated);
    }

    #[tokio::test]
    async fn scenarios_are_classified() {
        let (mock, pipeline) = pipeline();
        let token = Token::new("fake.jwt.token.admin");

        mock.set_scenario(Scenario::TokenExpired);
        let failure = pipeline.fetch_identity(Some(&token)).await.unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Expired);

        mock.set_scenario(Scenario::ServerError);
        let failure = pipeline.fetch_identity(Some(&token)).await.unwrap_err();
        assert_eq!(failure.kind(), FailureKind::ServerError);
        assert_eq!(failure.message(), "Server error");

        mock.set_scenario(Scenario::Forbidden);
        let failure = pipeline.fetch_protected(Some(&token)).await.unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Forbidden);
    }

    #[tokio::test]
    async fn protected_resource_requires_admin() {
        let (_, pipeline) = pipeline();

        let resource = pipeline
            .fetch_protected(Some(&Token::new("fake.jwt.token.admin")))
            .await
            .unwrap();
        assert!(resource.secret.contains("admin secret"));

        let failure = pipeline
            .fetch_protected(Some(&Token::new("fake.jwt.token.user")))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), FailureKind::Forbidden);
    }
}
