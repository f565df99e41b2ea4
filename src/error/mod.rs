mod internal;
pub use internal::{Error, ErrorKind};
