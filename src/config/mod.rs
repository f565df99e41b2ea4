mod initialize;
pub use initialize::Initializer;

mod config;
pub use config::{Config, StoreConfig};

pub mod env {
    /// Tracing filter directive.
    pub const LOG_DIRECTIVE: &str = "SESSIONGATE_LOG";
}
