mod identity;
pub use self::identity::{Identity, Role, Token};

mod session;
pub use self::session::Session;

mod context;
pub use self::context::{Epoch, SessionContext};
