//! Durable storage of the current session.
//!
//! The session is persisted under two independent keys, one for the token and
//! one for the serialized identity. A partial write is possible; readers never
//! trust an identity without a token and the identity fetch on entering a
//! protected view re-validates whatever identity was stored.

use async_trait::async_trait;

use crate::common::{warn, Result};
use crate::session::{Identity, Session, Token};

mod file;
pub use self::file::FileStore;

mod memory;
pub use self::memory::MemoryStore;

pub mod key {
    pub const TOKEN: &str = "auth_token";
    pub const IDENTITY: &str = "auth_user";
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fields that were never written, or were cleared, are absent.
    async fn read(&self) -> Result<Session>;
    async fn write_token(&self, token: &Token) -> Result<()>;
    async fn write_identity(&self, identity: &Identity) -> Result<()>;
    /// Remove both keys. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}

// Decode a persisted identity record. A record that no longer parses is
// treated as absent, the next identity fetch replaces it.
pub(crate) fn decode_identity(raw: &str) -> Option<Identity> {
    match serde_json::from_str::<Identity>(raw) {
        Ok(identity) => Some(identity),
        Err(err) => {
            warn!(%err, "Discard undecodable stored identity");
            None
        }
    }
}
