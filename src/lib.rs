#![allow(clippy::module_inception)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod mock;
pub mod pipeline;
pub mod session;
pub mod store;

pub use crate::error::{Error, ErrorKind};
pub type Result<T, E = crate::error::Error> = std::result::Result<T, E>;

pub use session::{Identity, Role, Session, SessionContext, Token};

pub(crate) mod common {
    pub(crate) use crate::error::{Error, ErrorKind};
    pub(crate) use crate::Result;

    pub(crate) type Time = chrono::DateTime<chrono::Utc>;

    pub use tracing::{debug, error, info, trace, warn};
}
