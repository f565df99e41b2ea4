use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::common::{Error, ErrorKind, Result};
use crate::session::{Identity, Session, Token};
use crate::store::{decode_identity, key, SessionStore};

/// Non durable store keeping the same two-key layout as `FileStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<&'static str, String>>,
    unavailable: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail as if the backing storage vanished.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock() = unavailable;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn check(&self) -> Result<()> {
        if *self.unavailable.lock() {
            Err(Error::from(ErrorKind::Storage {
                description: "memory store unavailable".to_owned(),
            }))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn read(&self) -> Result<Session> {
        self.check()?;
        let entries = self.entries.lock();
        let token = entries.get(key::TOKEN).cloned().map(Token::new);
        let identity = entries
            .get(key::IDENTITY)
            .and_then(|raw| decode_identity(raw));
        Ok(Session::new(token, identity))
    }

    async fn write_token(&self, token: &Token) -> Result<()> {
        self.check()?;
        self.entries
            .lock()
            .insert(key::TOKEN, token.as_str().to_owned());
        Ok(())
    }

    async fn write_identity(&self, identity: &Identity) -> Result<()> {
        self.check()?;
        let raw = serde_json::to_string(identity)?;
        self.entries.lock().insert(key::IDENTITY, raw);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check()?;
        let mut entries = self.entries.lock();
        entries.remove(key::TOKEN);
        entries.remove(key::IDENTITY);
        Ok(())
    }
}
