mod controller;
pub use self::controller::{FetchState, SessionFetchController, Transition};
