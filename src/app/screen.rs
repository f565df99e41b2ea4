use std::fmt;

use crate::app::Route;
use crate::session::Identity;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginScreen {
    // Route to return to after a successful login.
    pub from: Option<Route>,
    pub session_expired: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardScreen {
    Loading,
    Ready {
        identity: Identity,
        show_admin_link: bool,
    },
    Error {
        message: String,
        can_retry: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminScreen {
    Ready { secret: String },
    Error { message: String },
}

/// What the current route renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Login(LoginScreen),
    Forbidden,
    Dashboard(DashboardScreen),
    Admin(AdminScreen),
}

impl Screen {
    pub fn route(&self) -> Route {
        match self {
            Screen::Login(_) => Route::Login,
            Screen::Forbidden => Route::Forbidden,
            Screen::Dashboard(_) => Route::Dashboard,
            Screen::Admin(_) => Route::Admin,
        }
    }

    pub fn session_expired(&self) -> bool {
        matches!(self, Screen::Login(LoginScreen { session_expired: true, .. }))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Screen::Login(login) => login.error.as_deref(),
            Screen::Dashboard(DashboardScreen::Error { message, .. }) => Some(message),
            Screen::Admin(AdminScreen::Error { message }) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Screen::Login(login) => {
                writeln!(f, "Login")?;
                if login.session_expired {
                    writeln!(f, "Session expired. Please login again.")?;
                }
                if let Some(error) = &login.error {
                    writeln!(f, "Error: {}", error)?;
                }
                Ok(())
            }
            Screen::Forbidden => {
                writeln!(f, "403 - Forbidden")?;
                writeln!(f, "You don't have permission to access this page.")
            }
            Screen::Dashboard(DashboardScreen::Loading) => writeln!(f, "Loading..."),
            Screen::Dashboard(DashboardScreen::Ready {
                identity,
                show_admin_link,
            }) => {
                writeln!(f, "Welcome, {}!", identity.username())?;
                writeln!(f, "Username: {}", identity.username())?;
                writeln!(f, "Role: {}", identity.role())?;
                if *show_admin_link {
                    writeln!(f, "Admin Panel: {}", Route::Admin)?;
                }
                Ok(())
            }
            Screen::Dashboard(DashboardScreen::Error { message, can_retry }) => {
                writeln!(f, "Error: {}", message)?;
                if *can_retry {
                    writeln!(f, "Retry available")?;
                }
                Ok(())
            }
            Screen::Admin(AdminScreen::Ready { secret }) => {
                writeln!(f, "Admin Panel")?;
                writeln!(f, "Top Secret Information")?;
                writeln!(f, "{}", secret)
            }
            Screen::Admin(AdminScreen::Error { message }) => writeln!(f, "Error: {}", message),
        }
    }
}
