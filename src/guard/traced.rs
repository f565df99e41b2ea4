use crate::app::Route;
use crate::common::debug;
use crate::guard::{Decision, Gate};
use crate::session::Session;

// Logs every decision of the wrapped gate.
#[derive(Debug, Clone)]
pub struct Traced<G> {
    next: G,
}

impl<G> Traced<G> {
    pub fn new(next: G) -> Self {
        Self { next }
    }
}

impl<G: Gate> Gate for Traced<G> {
    fn check(&self, session: &Session, requested: Route) -> Decision {
        let decision = self.next.check(session, requested);
        debug!(
            route = %requested,
            authenticated = session.is_authenticated(),
            role = ?session.identity().map(|i| i.role()),
            ?decision,
            "Gate decision"
        );
        decision
    }
}
