//! Scenario driven stand-in for the identity service.
//!
//! Used in-process as a `Transport` and over http through `server`.

mod scenario;
pub use self::scenario::Scenario;

mod service;
pub use self::service::MockIdentityService;

pub mod server;
pub use self::server::MockServer;
