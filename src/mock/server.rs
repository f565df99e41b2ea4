use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::time::Duration;

use crate::common::{error, info, Result};
use crate::mock::{MockIdentityService, Scenario};
use crate::pipeline::{Endpoint, Request, Response};
use crate::session::Token;

// Mock server configuration.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    // http listen host.
    listen_host: Option<String>,
    // http listen port.
    listen_port: Option<String>,
    // Scenario active at startup.
    scenario: Option<Scenario>,
    // Delay applied to every response.
    delay_milliseconds: Option<u64>,
}

impl Config {
    const DEFAULT_LISTEN_HOST: &'static str = "127.0.0.1";
    const DEFAULT_LISTEN_PORT: &'static str = "7878";

    pub fn set_listen_host(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.listen_host = Some(val)
        }
    }
    pub fn set_listen_port(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.listen_port = Some(val)
        }
    }
    pub fn set_scenario(&mut self, val: Option<Scenario>) {
        if let Some(val) = val {
            self.scenario = Some(val)
        }
    }
    pub fn set_delay_milliseconds(&mut self, val: Option<u64>) {
        if let Some(val) = val {
            self.delay_milliseconds = Some(val)
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut Config) {
        self.set_listen_host(&mut other.listen_host);
        self.set_listen_port(&mut other.listen_port);
        self.set_scenario(other.scenario);
        self.set_delay_milliseconds(other.delay_milliseconds);
    }

    pub fn listen_addr(&self) -> String {
        format!(
            "{}:{}",
            self.listen_host
                .as_deref()
                .unwrap_or(Config::DEFAULT_LISTEN_HOST),
            self.listen_port
                .as_deref()
                .unwrap_or(Config::DEFAULT_LISTEN_PORT),
        )
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario.unwrap_or_default()
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_milliseconds.unwrap_or(0))
    }
}

// Runtime switches exposed for manual testing.
#[derive(Debug, Serialize, Deserialize, Default)]
struct DevSettings {
    scenario: Option<Scenario>,
    delay_milliseconds: Option<u64>,
}

/// Serves `MockIdentityService` over http under `/api`.
pub struct MockServer {
    service: Arc<MockIdentityService>,
}

impl MockServer {
    pub fn new(config: &Config) -> Self {
        Self::with_service(Arc::new(MockIdentityService::with_settings(
            config.scenario(),
            config.delay(),
        )))
    }

    pub fn with_service(service: Arc<MockIdentityService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> Arc<MockIdentityService> {
        self.service.clone()
    }

    pub fn router(&self) -> Router {
        let api = Router::new()
            .route("/login", post(login))
            .route("/me", get(me))
            .route("/admin/secret", get(admin_secret))
            .route("/__dev/settings", get(dev_settings).put(update_dev_settings));

        Router::new()
            .nest("/api", api)
            .with_state(self.service.clone())
    }

    /// Serve until `shutdown` resolves, then let in-flight requests finish.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future + Send + 'static,
    ) -> Result<()> {
        let shutdown = async move {
            shutdown.await;
            info!("Shutdown signal received");
        };

        info!(
            addr = ?listener.local_addr().ok(),
            scenario = %self.service.scenario(),
            "Mock identity service running"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| {
                error!(%err, "Mock server failed");
                err
            })?;

        info!("Shutdown successfully completed");
        Ok(())
    }
}

type Service = State<Arc<MockIdentityService>>;

async fn login(State(service): Service, body: Bytes) -> impl IntoResponse {
    let mut request = Request::new(Endpoint::Login);
    if let Ok(body) = serde_json::from_slice(&body) {
        request = request.with_body(body);
    }
    into_http(service.handle(request).await)
}

async fn me(State(service): Service, headers: HeaderMap) -> impl IntoResponse {
    let request = Request::new(Endpoint::Me).with_bearer(bearer(&headers).as_ref());
    into_http(service.handle(request).await)
}

async fn admin_secret(State(service): Service, headers: HeaderMap) -> impl IntoResponse {
    let request = Request::new(Endpoint::AdminSecret).with_bearer(bearer(&headers).as_ref());
    into_http(service.handle(request).await)
}

async fn dev_settings(State(service): Service) -> Json<DevSettings> {
    Json(DevSettings {
        scenario: Some(service.scenario()),
        delay_milliseconds: Some(service.delay().as_millis() as u64),
    })
}

async fn update_dev_settings(
    State(service): Service,
    Json(settings): Json<DevSettings>,
) -> Json<DevSettings> {
    if let Some(scenario) = settings.scenario {
        service.set_scenario(scenario);
    }
    if let Some(delay) = settings.delay_milliseconds {
        service.set_delay(Duration::from_millis(delay));
    }
    info!(scenario = %service.scenario(), delay = ?service.delay(), "Dev settings updated");
    dev_settings(State(service)).await
}

// Only a well formed `Bearer <token>` header counts as a credential.
fn bearer(headers: &HeaderMap) -> Option<Token> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(Token::from)
}

fn into_http(response: Response) -> axum::response::Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}
