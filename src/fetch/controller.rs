use std::sync::Arc;

use parking_lot::Mutex;

use crate::app::Route;
use crate::common::{debug, error, info, Time};
use crate::guard::Redirect;
use crate::pipeline::{FailureKind, RequestPipeline};
use crate::session::{Identity, SessionContext};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    // Nothing loaded for the current session, also the result of a response
    // that arrived after a login or logout.
    Idle,
    Loading,
    Success {
        identity: Identity,
        fetched_at: Time,
    },
    // Session is intact, a manual retry is offered.
    RecoverableError {
        message: String,
    },
    // Session was terminated, navigate to login with the expired notice.
    ExpiredRedirect(Redirect),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn can_retry(&self) -> bool {
        matches!(
            self,
            FetchState::Idle | FetchState::RecoverableError { .. } | FetchState::Success { .. }
        )
    }
}

/// Result of asking the controller to load.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    // A fetch was already in flight, or the activation already redirected.
    Ignored,
    // The controller was deactivated while the request was in flight.
    Abandoned,
    Settled(FetchState),
}

struct Inner {
    state: FetchState,
    // Bumped on deactivate, responses from an older generation are dropped.
    generation: u64,
}

/// Loads the current identity when a protected view is entered.
///
/// `Idle -> Loading -> {Success, RecoverableError, ExpiredRedirect, Idle}`;
/// `retry` re-enters `Loading` from any settled state but `ExpiredRedirect`.
pub struct SessionFetchController {
    context: Arc<SessionContext>,
    pipeline: RequestPipeline,
    route: Route,
    inner: Mutex<Inner>,
}

impl SessionFetchController {
    pub fn new(context: Arc<SessionContext>, pipeline: RequestPipeline, route: Route) -> Self {
        Self {
            context,
            pipeline,
            route,
            inner: Mutex::new(Inner {
                state: FetchState::Idle,
                generation: 0,
            }),
        }
    }

    pub fn state(&self) -> FetchState {
        self.inner.lock().state.clone()
    }

    /// Start loading for a fresh activation of the view.
    pub async fn activate(&self) -> Transition {
        self.load().await
    }

    /// Manual retry. No backoff and no attempt limit.
    pub async fn retry(&self) -> Transition {
        if !self.state().can_retry() {
            debug!(state = ?self.state(), "Retry ignored");
            return Transition::Ignored;
        }
        self.load().await
    }

    /// The view went away. Any in-flight response is discarded.
    pub fn deactivate(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = FetchState::Idle;
    }

    async fn load(&self) -> Transition {
        let generation = {
            let mut inner = self.inner.lock();
            match inner.state {
                FetchState::Loading | FetchState::ExpiredRedirect(_) => {
                    return Transition::Ignored;
                }
                _ => (),
            }
            inner.state = FetchState::Loading;
            inner.generation
        };

        let epoch = self.context.epoch();
        let session = self.context.current();
        let outcome = self.pipeline.fetch_identity(session.token()).await;

        if self.is_stale(generation) {
            debug!(route = %self.route, "Identity response for abandoned activation dropped");
            return Transition::Abandoned;
        }

        let next = match outcome {
            Ok(identity) => self.apply_identity(epoch, identity).await,
            Err(failure) => match failure.kind() {
                FailureKind::Expired | FailureKind::Unauthenticated => {
                    match self.context.terminate_at(epoch).await {
                        // The rejected credential is no longer the session's.
                        Ok(false) => FetchState::Idle,
                        Ok(true) => {
                            info!(kind = ?failure.kind(), "Session ended by identity service");
                            FetchState::ExpiredRedirect(Redirect::session_expired(Some(self.route)))
                        }
                        // Memory is cleared even when the store fails.
                        Err(err) => {
                            error!(%err, "Terminate after rejected credential");
                            FetchState::ExpiredRedirect(Redirect::session_expired(Some(self.route)))
                        }
                    }
                }
                FailureKind::Forbidden | FailureKind::ServerError => {
                    FetchState::RecoverableError {
                        message: failure.message().to_owned(),
                    }
                }
            },
        };

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return Transition::Abandoned;
        }
        inner.state = next.clone();
        Transition::Settled(next)
    }

    async fn apply_identity(&self, epoch: u64, identity: Identity) -> FetchState {
        match self.context.update_identity_at(epoch, identity.clone()).await {
            Ok(true) => FetchState::Success {
                identity,
                fetched_at: chrono::Utc::now(),
            },
            // Logged in or out meanwhile, the response belongs to another session.
            Ok(false) => FetchState::Idle,
            Err(err) => {
                error!(%err, "Store fetched identity");
                FetchState::RecoverableError {
                    message: err.to_string(),
                }
            }
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.lock().generation != generation
    }
}
