use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use tokio::time::Duration;

use crate::common::{debug, Result};
use crate::mock::Scenario;
use crate::pipeline::{Endpoint, Request, Response, Transport};
use crate::session::{Role, Token};

struct User {
    username: &'static str,
    password: &'static str,
    role: Role,
}

static USERS: [User; 2] = [
    User {
        username: "admin",
        password: "admin123",
        role: Role::Admin,
    },
    User {
        username: "user",
        password: "user123",
        role: Role::User,
    },
];

const TOKEN_PREFIX: &str = "fake.jwt.token.";
// Oldest requests are dropped beyond this many.
const RECEIVED_CAPACITY: usize = 256;
pub(crate) const ADMIN_SECRET: &str = "This is the admin secret! Only admins can see this.";

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

struct Settings {
    scenario: Scenario,
    delay: Duration,
}

/// In-memory identity service with switchable failure scenarios.
///
/// Responses queued with `push_response` are served first, in order, before
/// the scenario logic is consulted.
pub struct MockIdentityService {
    settings: Mutex<Settings>,
    scripted: Mutex<HashMap<Endpoint, VecDeque<Response>>>,
    received: Mutex<VecDeque<Request>>,
}

impl Default for MockIdentityService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityService {
    pub fn new() -> Self {
        Self::with_settings(Scenario::Success, Duration::from_millis(0))
    }

    pub fn with_settings(scenario: Scenario, delay: Duration) -> Self {
        Self {
            settings: Mutex::new(Settings { scenario, delay }),
            scripted: Mutex::new(HashMap::new()),
            received: Mutex::new(VecDeque::new()),
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.settings.lock().scenario
    }

    pub fn set_scenario(&self, scenario: Scenario) {
        self.settings.lock().scenario = scenario;
    }

    pub fn delay(&self) -> Duration {
        self.settings.lock().delay
    }

    pub fn set_delay(&self, delay: Duration) {
        self.settings.lock().delay = delay;
    }

    pub fn push_response(&self, endpoint: Endpoint, response: Response) {
        self.scripted
            .lock()
            .entry(endpoint)
            .or_default()
            .push_back(response);
    }

    /// Most recent requests received, oldest first.
    pub fn received(&self) -> Vec<Request> {
        self.received.lock().iter().cloned().collect()
    }

    pub fn received_count(&self, endpoint: Endpoint) -> usize {
        self.received
            .lock()
            .iter()
            .filter(|request| request.endpoint == endpoint)
            .count()
    }

    pub async fn handle(&self, request: Request) -> Response {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        {
            let mut received = self.received.lock();
            if received.len() == RECEIVED_CAPACITY {
                received.pop_front();
            }
            received.push_back(request.clone());
        }

        let scripted = self
            .scripted
            .lock()
            .get_mut(&request.endpoint)
            .and_then(|queue| queue.pop_front());
        if let Some(response) = scripted {
            debug!(endpoint = %request.endpoint, status = response.status, "Scripted response");
            return response;
        }

        let scenario = self.scenario();
        let response = match request.endpoint {
            Endpoint::Login => Self::login(scenario, &request),
            Endpoint::Me => Self::me(scenario, &request),
            Endpoint::AdminSecret => Self::admin_secret(scenario, &request),
        };
        debug!(endpoint = %request.endpoint, %scenario, status = response.status, "Mock response");
        response
    }

    fn login(scenario: Scenario, request: &Request) -> Response {
        match scenario {
            Scenario::ServerError => return message(500, "Server error"),
            Scenario::InvalidPassword => return message(401, "Invalid credentials"),
            _ => (),
        }

        let body = match request
            .body
            .clone()
            .and_then(|body| serde_json::from_value::<LoginBody>(body).ok())
        {
            Some(body) => body,
            None => return message(400, "Bad request"),
        };

        match USERS
            .iter()
            .find(|u| u.username == body.username && u.password == body.password)
        {
            Some(user) => Response::json(
                200,
                &json!({
                    "accessToken": token_for(user.role).as_str(),
                    "user": { "username": user.username, "role": user.role },
                }),
            ),
            None => message(401, "Invalid credentials"),
        }
    }

    fn me(scenario: Scenario, request: &Request) -> Response {
        let token = match request.bearer.as_ref() {
            Some(token) => token,
            None => return message(401, "Unauthorized"),
        };
        match scenario {
            Scenario::TokenExpired => {
                return Response::json(
                    401,
                    &json!({ "message": "Token expired", "code": "token_expired" }),
                )
            }
            Scenario::ServerError => return message(500, "Server error"),
            _ => (),
        }

        match user_for(token) {
            Some(user) => Response::json(
                200,
                &json!({ "username": user.username, "role": user.role }),
            ),
            None => message(401, "Invalid token"),
        }
    }

    fn admin_secret(scenario: Scenario, request: &Request) -> Response {
        let token = match request.bearer.as_ref() {
            Some(token) => token,
            None => return message(401, "Unauthorized"),
        };
        if scenario == Scenario::ServerError {
            return message(500, "Server error");
        }

        match user_for(token) {
            None => message(401, "Invalid token"),
            Some(user) if scenario == Scenario::Forbidden || user.role != Role::Admin => {
                message(403, "Forbidden")
            }
            Some(_) => Response::json(200, &json!({ "secret": ADMIN_SECRET })),
        }
    }
}

fn message(status: u16, message: &str) -> Response {
    Response::json(status, &json!({ "message": message }))
}

fn token_for(role: Role) -> Token {
    Token::new(format!("{}{}", TOKEN_PREFIX, role))
}

fn user_for(token: &Token) -> Option<&'static User> {
    USERS.iter().find(|u| token_for(u.role) == *token)
}

#[async_trait]
impl Transport for MockIdentityService {
    async fn send(&self, request: Request) -> Result<Response> {
        Ok(self.handle(request).await)
    }
}
