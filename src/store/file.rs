use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::common::{debug, warn, Error, ErrorKind, Result};
use crate::session::{Identity, Session, Token};
use crate::store::{decode_identity, key, SessionStore};

/// Stores each key as a file under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error(key, err)),
        }
    }

    // Write through a temporary file so a single key is never half written.
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root_dir)
            .await
            .map_err(|err| storage_error(key, err))?;

        let tmp = self.path(&format!("{}.tmp", key));
        fs::write(&tmp, value.as_bytes())
            .await
            .map_err(|err| storage_error(key, err))?;
        fs::rename(&tmp, self.path(key))
            .await
            .map_err(|err| storage_error(key, err))?;

        debug!(key, "Stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error(key, err)),
        }
    }
}

fn storage_error(key: &str, err: io::Error) -> Error {
    Error::from(ErrorKind::Storage {
        description: format!("{}: {}", key, err),
    })
}

#[async_trait]
impl SessionStore for FileStore {
    async fn read(&self) -> Result<Session> {
        let token = self.get(key::TOKEN).await?.map(Token::new);
        let identity = self
            .get(key::IDENTITY)
            .await?
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| decode_identity(&raw));

        if token.is_none() && identity.is_some() {
            warn!("Stored identity without token ignored");
        }

        Ok(Session::new(token, identity))
    }

    async fn write_token(&self, token: &Token) -> Result<()> {
        self.put(key::TOKEN, token.as_str()).await
    }

    async fn write_identity(&self, identity: &Identity) -> Result<()> {
        let raw = serde_json::to_string(identity)?;
        self.put(key::IDENTITY, &raw).await
    }

    async fn clear(&self) -> Result<()> {
        self.remove(key::TOKEN).await?;
        self.remove(key::IDENTITY).await
    }
}
