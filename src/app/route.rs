use std::fmt;

use crate::guard::{Allow, Authenticated, Gate, RequireRole, Traced};
use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Forbidden,
    Dashboard,
    Admin,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Forbidden => "/403",
            Route::Dashboard => "/dashboard",
            Route::Admin => "/admin",
        }
    }

    /// Resolve a path. Anything unknown, including `/`, lands on login.
    pub fn from_path(path: &str) -> Route {
        let path = path.trim_end_matches('/');
        match path {
            "/dashboard" | "dashboard" => Route::Dashboard,
            "/admin" | "admin" => Route::Admin,
            "/403" | "403" | "/forbidden" | "forbidden" => Route::Forbidden,
            _ => Route::Login,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Forbidden)
    }

    // Route table. Public routes have no gate.
    pub(crate) fn gate(&self) -> Option<Box<dyn Gate + Send + Sync>> {
        match self {
            Route::Login | Route::Forbidden => None,
            Route::Dashboard => Some(Box::new(Traced::new(Authenticated::new(Allow)))),
            Route::Admin => Some(Box::new(Traced::new(Authenticated::new(
                RequireRole::new(Role::Admin, Allow),
            )))),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_paths() {
        assert_eq!(Route::from_path("/dashboard"), Route::Dashboard);
        assert_eq!(Route::from_path("/admin/"), Route::Admin);
        assert_eq!(Route::from_path("/403"), Route::Forbidden);
        assert_eq!(Route::from_path("/"), Route::Login);
        assert_eq!(Route::from_path("/nowhere"), Route::Login);
    }

    #[test]
    fn only_protected_routes_have_gates() {
        for route in [Route::Login, Route::Forbidden, Route::Dashboard, Route::Admin] {
            assert_eq!(route.gate().is_none(), route.is_public());
        }
    }
}
