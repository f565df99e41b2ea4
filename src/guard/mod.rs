//! Navigation gates.
//!
//! Gates wrap each other the way a view is wrapped in the route table:
//! `Authenticated::new(RequireRole::new(Role::Admin, Allow))`. Each gate either
//! redirects or defers to the gate it wraps. Gates only read the session
//! snapshot they are given; they never perform requests.

use crate::app::Route;
use crate::session::Session;

mod authenticated;
pub use self::authenticated::Authenticated;

mod role;
pub use self::role::RequireRole;

mod traced;
pub use self::traced::Traced;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    // Where the user was heading, so login can send them back.
    pub from: Option<Route>,
    pub session_expired: bool,
}

impl Redirect {
    pub fn to_login(from: Option<Route>) -> Self {
        Self {
            to: Route::Login,
            from,
            session_expired: false,
        }
    }

    pub fn session_expired(from: Option<Route>) -> Self {
        Self {
            to: Route::Login,
            from,
            session_expired: true,
        }
    }

    pub fn to_forbidden() -> Self {
        Self {
            to: Route::Forbidden,
            from: None,
            session_expired: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render,
    Redirect(Redirect),
}

impl Decision {
    pub fn is_render(&self) -> bool {
        matches!(self, Decision::Render)
    }
}

pub trait Gate {
    fn check(&self, session: &Session, requested: Route) -> Decision;
}

// Innermost gate, always renders the view.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allow;

impl Gate for Allow {
    fn check(&self, _session: &Session, _requested: Route) -> Decision {
        Decision::Render
    }
}

impl<G: Gate + ?Sized> Gate for Box<G> {
    fn check(&self, session: &Session, requested: Route) -> Decision {
        (**self).check(session, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Identity, Role, Token};

    fn session(role: Option<Role>) -> Session {
        Session::new(
            Some(Token::new("t")),
            role.map(|role| Identity::new("someone", role).unwrap()),
        )
    }

    fn admin_gate() -> impl Gate {
        Authenticated::new(RequireRole::new(Role::Admin, Allow))
    }

    #[test]
    fn no_token_always_goes_to_login() {
        let anonymous = Session::anonymous();
        for route in [Route::Dashboard, Route::Admin] {
            let decision = Authenticated::new(Allow).check(&anonymous, route);
            assert_eq!(decision, Decision::Redirect(Redirect::to_login(Some(route))));
        }
        assert_eq!(
            admin_gate().check(&anonymous, Route::Admin),
            Decision::Redirect(Redirect::to_login(Some(Route::Admin)))
        );
    }

    #[test]
    fn admin_gate_by_role() {
        assert_eq!(
            admin_gate().check(&session(Some(Role::User)), Route::Admin),
            Decision::Redirect(Redirect::to_forbidden())
        );
        assert_eq!(
            admin_gate().check(&session(Some(Role::Admin)), Route::Admin),
            Decision::Render
        );
        // Token without identity yet.
        assert_eq!(
            admin_gate().check(&session(None), Route::Admin),
            Decision::Redirect(Redirect::to_forbidden())
        );
    }

    #[test]
    fn token_without_identity_is_authenticated() {
        assert!(Authenticated::new(Allow)
            .check(&session(None), Route::Dashboard)
            .is_render());
    }

    #[test]
    fn boxed_gates_compose() {
        let gate: Box<dyn Gate> = Box::new(Traced::new(admin_gate()));
        assert!(gate.check(&session(Some(Role::Admin)), Route::Admin).is_render());
    }
}
