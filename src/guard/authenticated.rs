use crate::app::Route;
use crate::guard::{Decision, Gate, Redirect};
use crate::session::Session;

/// Sends sessions without a token to login, remembering the requested route.
#[derive(Debug, Clone)]
pub struct Authenticated<G> {
    next: G,
}

impl<G> Authenticated<G> {
    pub fn new(next: G) -> Self {
        Self { next }
    }
}

impl<G: Gate> Gate for Authenticated<G> {
    fn check(&self, session: &Session, requested: Route) -> Decision {
        if !session.is_authenticated() {
            return Decision::Redirect(Redirect::to_login(Some(requested)));
        }
        self.next.check(session, requested)
    }
}
