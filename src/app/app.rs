use std::sync::Arc;

use crate::app::{AdminScreen, DashboardScreen, LoginScreen, Route, Screen};
use crate::common::{debug, error, info, Result};
use crate::fetch::{FetchState, SessionFetchController, Transition};
use crate::guard::{Decision, Redirect};
use crate::pipeline::{Credentials, RequestPipeline};
use crate::session::SessionContext;

const SESSION_CHANGED: &str = "Session changed while loading";

/// Drives navigation for a single user of the application.
///
/// Every route change goes through the route's gates against the current
/// session. Protected views then load their data through the pipeline.
pub struct App {
    context: Arc<SessionContext>,
    pipeline: RequestPipeline,
    screen: Screen,
    // Fetch controller of the mounted dashboard, if any.
    dashboard: Option<Arc<SessionFetchController>>,
}

impl App {
    pub fn new(context: Arc<SessionContext>, pipeline: RequestPipeline) -> Self {
        Self {
            context,
            pipeline,
            screen: Screen::Login(LoginScreen::default()),
            dashboard: None,
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn location(&self) -> Route {
        self.screen.route()
    }

    pub async fn visit(&mut self, path: &str) -> &Screen {
        self.navigate(Route::from_path(path)).await;
        &self.screen
    }

    /// Submit the login form.
    ///
    /// On success the session is established and the user is sent where they
    /// were heading before login, the dashboard otherwise. A rejected login
    /// stays on the form with the message and leaves the session alone.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Screen> {
        let mut form = match &self.screen {
            Screen::Login(login) => login.clone(),
            _ => LoginScreen::default(),
        };

        let credentials = Credentials::new(username, password);
        match self.pipeline.login(&credentials).await {
            Ok(grant) => {
                let (token, identity) = grant.into_parts();
                self.context.establish(token, identity).await?;
                info!(user = username, "Logged in");

                self.navigate(form.from.unwrap_or(Route::Dashboard)).await;
            }
            Err(failure) => {
                info!(user = username, kind = ?failure.kind(), "Login rejected");
                form.error = Some(failure.message().to_owned());
                self.screen = Screen::Login(form);
            }
        }

        Ok(&self.screen)
    }

    pub async fn logout(&mut self) -> Result<&Screen> {
        self.leave();
        let result = self.context.terminate().await;
        self.screen = Screen::Login(LoginScreen::default());
        result.map(|_| &self.screen)
    }

    /// Retry the dashboard identity fetch after a recoverable error.
    pub async fn retry(&mut self) -> &Screen {
        let controller = match (&self.screen, &self.dashboard) {
            (Screen::Dashboard(_), Some(controller)) => controller.clone(),
            _ => return &self.screen,
        };

        let transition = controller.retry().await;
        self.settle(controller, transition).await;
        &self.screen
    }

    fn check(&self, route: Route) -> Decision {
        match route.gate() {
            Some(gate) => gate.check(&self.context.current(), route),
            None => Decision::Render,
        }
    }

    async fn navigate(&mut self, route: Route) {
        self.leave();

        match self.check(route) {
            Decision::Redirect(redirect) => self.redirect(redirect),
            Decision::Render => self.render(route).await,
        }
    }

    fn redirect(&mut self, redirect: Redirect) {
        self.leave();
        self.screen = match redirect.to {
            Route::Forbidden => Screen::Forbidden,
            // Gates only ever redirect to public routes.
            _ => Screen::Login(LoginScreen {
                from: redirect.from,
                session_expired: redirect.session_expired,
                error: None,
            }),
        };
    }

    async fn render(&mut self, route: Route) {
        match route {
            Route::Login => self.screen = Screen::Login(LoginScreen::default()),
            Route::Forbidden => self.screen = Screen::Forbidden,
            Route::Dashboard => self.mount_dashboard().await,
            Route::Admin => self.mount_admin().await,
        }
    }

    async fn mount_dashboard(&mut self) {
        let controller = Arc::new(SessionFetchController::new(
            self.context.clone(),
            self.pipeline.clone(),
            Route::Dashboard,
        ));
        self.dashboard = Some(controller.clone());
        self.screen = Screen::Dashboard(DashboardScreen::Loading);

        let transition = controller.activate().await;
        self.settle(controller, transition).await;
    }

    // A response for a session that was replaced meanwhile settles the
    // controller back to `Idle`. The gates are checked again against the
    // session now held before loading once more.
    async fn settle(&mut self, controller: Arc<SessionFetchController>, transition: Transition) {
        let transition = match transition {
            Transition::Settled(FetchState::Idle) => {
                if let Decision::Redirect(redirect) = self.check(Route::Dashboard) {
                    self.redirect(redirect);
                    return;
                }
                controller.retry().await
            }
            other => other,
        };
        self.apply_transition(transition);
    }

    fn apply_transition(&mut self, transition: Transition) {
        let state = match transition {
            Transition::Settled(state) => state,
            Transition::Ignored | Transition::Abandoned => return,
        };

        match state {
            FetchState::Loading => self.screen = Screen::Dashboard(DashboardScreen::Loading),
            // Still out of date after reloading, the controller accepts a retry.
            FetchState::Idle => {
                self.screen = Screen::Dashboard(DashboardScreen::Error {
                    message: SESSION_CHANGED.to_owned(),
                    can_retry: true,
                })
            }
            FetchState::Success { identity, .. } => {
                let show_admin_link = identity.is_admin();
                self.screen = Screen::Dashboard(DashboardScreen::Ready {
                    identity,
                    show_admin_link,
                });
            }
            FetchState::RecoverableError { message } => {
                self.screen = Screen::Dashboard(DashboardScreen::Error {
                    message,
                    can_retry: true,
                })
            }
            FetchState::ExpiredRedirect(redirect) => self.redirect(redirect),
        }
    }

    async fn mount_admin(&mut self) {
        // A second attempt when the session changed while the request was in flight.
        for _ in 0..2 {
            let epoch = self.context.epoch();
            let session = self.context.current();

            match self.pipeline.fetch_protected(session.token()).await {
                Ok(resource) if self.context.epoch() == epoch => {
                    self.screen = Screen::Admin(AdminScreen::Ready {
                        secret: resource.secret,
                    });
                    return;
                }
                Ok(_) => (),
                Err(failure) if failure.kind().ends_session() => {
                    match self.context.terminate_at(epoch).await {
                        Ok(false) => (),
                        Ok(true) => {
                            self.redirect(Redirect::session_expired(Some(Route::Admin)));
                            return;
                        }
                        Err(err) => {
                            error!(%err, "Terminate after rejected credential");
                            self.redirect(Redirect::session_expired(Some(Route::Admin)));
                            return;
                        }
                    }
                }
                Err(failure) => {
                    self.screen = Screen::Admin(AdminScreen::Error {
                        message: failure.message().to_owned(),
                    });
                    return;
                }
            }

            debug!(route = %Route::Admin, "Response for a replaced session dropped");
            if let Decision::Redirect(redirect) = self.check(Route::Admin) {
                self.redirect(redirect);
                return;
            }
        }

        self.screen = Screen::Admin(AdminScreen::Error {
            message: SESSION_CHANGED.to_owned(),
        });
    }

    // Unmount the current view. Late responses for it are ignored.
    fn leave(&mut self) {
        if let Some(controller) = self.dashboard.take() {
            controller.deactivate();
        }
    }
}
