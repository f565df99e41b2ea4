//! Headless application shell: routes, the screens they render and the
//! navigation that ties gates, fetches and the session together.

mod route;
pub use self::route::Route;

mod screen;
pub use self::screen::{AdminScreen, DashboardScreen, LoginScreen, Screen};

mod app;
pub use self::app::App;
