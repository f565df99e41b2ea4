use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use sessiongate::app::{AdminScreen, App, DashboardScreen, Route, Screen};
use sessiongate::config::{Config, Initializer};
use sessiongate::Role;

struct Harness {
    addr: SocketAddr,
    store_dir: tempfile::TempDir,
    shutdown: Arc<Notify>,
    server: JoinHandle<sessiongate::Result<()>>,
}

impl Harness {
    async fn start() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("sessiongate=debug"))
            .with_test_writer()
            .try_init();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut initializer = Initializer::from_config(Config::default());
        initializer.set_listener(listener);

        // ctrl-c mock
        let shutdown = Arc::new(Notify::new());
        let notified = shutdown.clone();
        let server = tokio::spawn(async move {
            initializer
                .run_mock_server(async move { notified.notified().await })
                .await
        });

        Self {
            addr,
            store_dir: tempfile::tempdir().unwrap(),
            shutdown,
            server,
        }
    }

    fn initializer(&self) -> Initializer {
        let mut config = Config::default();
        config
            .client
            .set_base_url(&mut Some(format!("http://{}/api", self.addr)));
        config
            .store
            .set_dir(&mut Some(self.store_dir.path().to_path_buf()));
        Initializer::from_config(config)
    }

    // A fresh application instance sharing the persisted session.
    async fn app(&self) -> App {
        self.initializer().app().await.unwrap()
    }

    async fn set_scenario(&self, scenario: &str) {
        let response = reqwest::Client::new()
            .put(format!("http://{}/api/__dev/settings", self.addr))
            .json(&json!({ "scenario": scenario }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    async fn stop(self) {
        self.shutdown.notify_one();
        self.server.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn admin_reaches_protected_resource_and_session_survives_restart() {
    let harness = Harness::start().await;
    let mut app = harness.app().await;

    let screen = app.visit("/admin").await.clone();
    assert_eq!(screen.route(), Route::Login);

    let screen = app.login("admin", "admin123").await.unwrap().clone();
    assert_eq!(
        screen,
        Screen::Admin(AdminScreen::Ready {
            secret: "This is the admin secret! Only admins can see this.".to_owned()
        })
    );

    // Hydrated from the store directory, no login needed.
    let mut restarted = harness.app().await;
    assert!(restarted.context().is_authenticated());
    match restarted.visit("/dashboard").await {
        Screen::Dashboard(DashboardScreen::Ready {
            identity,
            show_admin_link,
        }) => {
            assert_eq!(identity.role(), Role::Admin);
            assert!(*show_admin_link);
        }
        other => panic!("unexpected {:?}", other),
    }

    restarted.logout().await.unwrap();
    let session = harness.initializer().session_store().read().await.unwrap();
    assert!(session.is_empty());

    harness.stop().await;
}

#[tokio::test]
async fn user_is_forbidden_from_admin() {
    let harness = Harness::start().await;
    let mut app = harness.app().await;

    app.visit("/login").await;
    app.login("user", "user123").await.unwrap();

    assert_eq!(app.visit("/admin").await, &Screen::Forbidden);
    assert!(app.context().is_authenticated());

    harness.stop().await;
}

#[tokio::test]
async fn expired_token_ends_session() {
    let harness = Harness::start().await;
    let mut app = harness.app().await;

    app.visit("/login").await;
    app.login("admin", "admin123").await.unwrap();

    harness.set_scenario("token_expired").await;
    let screen = app.visit("/dashboard").await.clone();
    assert!(screen.session_expired());
    assert_eq!(screen.to_string().lines().nth(1), Some("Session expired. Please login again."));

    let session = harness.initializer().session_store().read().await.unwrap();
    assert!(session.is_empty());

    harness.stop().await;
}

#[tokio::test]
async fn server_error_then_retry_recovers() {
    let harness = Harness::start().await;
    let mut app = harness.app().await;

    app.visit("/login").await;
    app.login("user", "user123").await.unwrap();

    harness.set_scenario("server_error").await;
    let screen = app.visit("/dashboard").await.clone();
    assert_eq!(
        screen,
        Screen::Dashboard(DashboardScreen::Error {
            message: "Server error".to_owned(),
            can_retry: true,
        })
    );
    assert!(app.context().is_authenticated());

    harness.set_scenario("success").await;
    let screen = app.retry().await.clone();
    assert!(matches!(screen, Screen::Dashboard(DashboardScreen::Ready { .. })));

    harness.stop().await;
}

#[tokio::test]
async fn rejected_login_leaves_storage_untouched() {
    let harness = Harness::start().await;
    let mut app = harness.app().await;

    app.visit("/login").await;
    let screen = app.login("admin", "wrong").await.unwrap().clone();
    assert_eq!(screen.error(), Some("Invalid credentials"));

    harness.set_scenario("server_error").await;
    let screen = app.login("admin", "admin123").await.unwrap().clone();
    assert_eq!(screen.error(), Some("Server error"));

    let session = harness.initializer().session_store().read().await.unwrap();
    assert!(session.is_empty());

    harness.stop().await;
}

#[tokio::test]
async fn unreachable_service_is_a_server_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config
        .client
        .set_base_url(&mut Some(format!("http://{}/api", addr)));
    config
        .store
        .set_dir(&mut Some(store_dir.path().to_path_buf()));
    config.client.set_timeout_milliseconds(Some(500));

    let mut app = Initializer::from_config(config).app().await.unwrap();
    app.visit("/login").await;
    let screen = app.login("admin", "admin123").await.unwrap().clone();
    assert_eq!(screen.error(), Some("Server error"));
}
