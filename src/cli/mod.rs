mod root;
pub use root::{parse, Command, GlobalOptions, SessiongateCommand};

pub mod login;
pub mod logout;
pub mod mock_server;
pub mod status;
pub mod visit;

/// How a successfully executed command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    // No usable session, or the identity service ended it.
    Unauthenticated,
}

impl Exit {
    pub fn code(&self) -> i32 {
        match self {
            Exit::Success => 0,
            Exit::Unauthenticated => 2,
        }
    }
}
