use crate::app::Route;
use crate::guard::{Decision, Gate, Redirect};
use crate::session::{Role, Session};

/// Sends sessions whose identity lacks `required` to the forbidden page.
///
/// A session whose identity has not been fetched yet is treated as lacking it.
#[derive(Debug, Clone)]
pub struct RequireRole<G> {
    required: Role,
    next: G,
}

impl<G> RequireRole<G> {
    pub fn new(required: Role, next: G) -> Self {
        Self { required, next }
    }
}

impl<G: Gate> Gate for RequireRole<G> {
    fn check(&self, session: &Session, requested: Route) -> Decision {
        match session.identity() {
            Some(identity) if identity.role().satisfies(self.required) => {
                self.next.check(session, requested)
            }
            _ => Decision::Redirect(Redirect::to_forbidden()),
        }
    }
}
