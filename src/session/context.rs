use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::common::{error, info, warn, ErrorKind, Result};
use crate::session::{Identity, Session, Token};
use crate::store::SessionStore;

// Monotonic counter bumped whenever the credential changes (establish or terminate).
// Identity refreshes keep the epoch, they do not change who the session belongs to.
pub type Epoch = u64;

struct State {
    session: Session,
    epoch: Epoch,
}

/// Process wide session state, hydrated from a `SessionStore`.
///
/// Readers get a snapshot through `current()` without waiting on writers.
/// Writers are serialized so that the persisted record and the in-memory
/// session change together from the caller's point of view.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    state: RwLock<State>,
    write: Mutex<()>,
}

impl SessionContext {
    /// Read the persisted session and build the context from it.
    pub async fn hydrate(store: Arc<dyn SessionStore>) -> Result<Self> {
        let session = store.read().await?;
        info!(
            authenticated = session.is_authenticated(),
            identity = ?session.identity(),
            "Session hydrated"
        );

        Ok(Self {
            store,
            state: RwLock::new(State { session, epoch: 0 }),
            write: Mutex::new(()),
        })
    }

    pub fn current(&self) -> Session {
        self.state.read().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().session.is_authenticated()
    }

    pub fn epoch(&self) -> Epoch {
        self.state.read().epoch
    }

    /// Record a freshly issued credential and its identity.
    ///
    /// Both keys are persisted before memory is touched. If persisting fails the
    /// in-memory session is left as it was and the error is returned.
    /// The previous record is cleared first, so a partial write leaves at most a
    /// token without identity, never a token paired with someone else's identity.
    pub async fn establish(&self, token: Token, identity: Identity) -> Result<()> {
        let _guard = self.write.lock().await;

        self.store.clear().await?;
        self.store.write_token(&token).await?;
        self.store.write_identity(&identity).await?;

        let mut state = self.state.write();
        state.session = Session::authenticated(token, identity);
        state.epoch += 1;
        info!(user = ?state.session.identity(), epoch = state.epoch, "Session established");

        Ok(())
    }

    /// Replace the identity of the current session.
    ///
    /// Calling this without a token is a programming error and is reported as
    /// `ErrorKind::IdentityWithoutToken`; nothing is stored in that case.
    pub async fn update_identity(&self, identity: Identity) -> Result<()> {
        let _guard = self.write.lock().await;
        self.update_identity_locked(identity).await
    }

    /// Like `update_identity`, but only when no login or logout happened since
    /// `epoch` was observed. Returns whether the identity was applied.
    pub async fn update_identity_at(&self, epoch: Epoch, identity: Identity) -> Result<bool> {
        let _guard = self.write.lock().await;
        if self.epoch() != epoch {
            warn!(expected = epoch, actual = self.epoch(), "Stale identity dropped");
            return Ok(false);
        }
        self.update_identity_locked(identity).await.map(|_| true)
    }

    async fn update_identity_locked(&self, identity: Identity) -> Result<()> {
        if !self.is_authenticated() {
            error!(user = ?identity, "Identity update without token");
            return Err(ErrorKind::IdentityWithoutToken.into());
        }

        self.store.write_identity(&identity).await?;

        let mut state = self.state.write();
        state.session.replace_identity(identity);
        info!(user = ?state.session.identity(), "Session identity updated");

        Ok(())
    }

    /// Clear both token and identity. Idempotent.
    ///
    /// Memory is cleared first so a failing store can never keep the
    /// application logged in; the storage error is still returned.
    pub async fn terminate(&self) -> Result<()> {
        let _guard = self.write.lock().await;
        self.terminate_locked().await
    }

    /// Terminate only if the session is still the one observed at `epoch`.
    pub async fn terminate_at(&self, epoch: Epoch) -> Result<bool> {
        let _guard = self.write.lock().await;
        if self.epoch() != epoch {
            warn!(expected = epoch, actual = self.epoch(), "Stale termination dropped");
            return Ok(false);
        }
        self.terminate_locked().await.map(|_| true)
    }

    async fn terminate_locked(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            if !state.session.is_empty() {
                state.session.clear();
                state.epoch += 1;
                info!(epoch = state.epoch, "Session terminated");
            }
        }

        self.store.clear().await.map_err(|err| {
            error!(%err, "Failed to clear session store");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::session::Role;
    use crate::store::MemoryStore;

    // Accepts everything except identity writes.
    struct IdentityWriteFails(MemoryStore);

    #[async_trait]
    impl SessionStore for IdentityWriteFails {
        async fn read(&self) -> Result<Session> {
            self.0.read().await
        }
        async fn write_token(&self, token: &Token) -> Result<()> {
            self.0.write_token(token).await
        }
        async fn write_identity(&self, _identity: &Identity) -> Result<()> {
            Err(ErrorKind::Storage {
                description: "disk full".to_owned(),
            }
            .into())
        }
        async fn clear(&self) -> Result<()> {
            self.0.clear().await
        }
    }

    fn admin() -> Identity {
        Identity::new("admin", Role::Admin).unwrap()
    }

    fn assert_invariant(ctx: &SessionContext) {
        let session = ctx.current();
        assert!(session.identity().is_none() || session.token().is_some());
    }

    #[test]
    fn hydrate_from_store() {
        tokio_test::block_on(async move {
            let store = Arc::new(MemoryStore::new());
            store.write_token(&Token::new("t1")).await.unwrap();
            store.write_identity(&admin()).await.unwrap();

            let ctx = SessionContext::hydrate(store).await.unwrap();
            let session = ctx.current();
            assert_eq!(session.token(), Some(&Token::new("t1")));
            assert_eq!(session.identity(), Some(&admin()));
            assert!(ctx.is_authenticated());
        })
    }

    #[test]
    fn establish_update_terminate() {
        tokio_test::block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let ctx = SessionContext::hydrate(store.clone()).await.unwrap();
            assert!(!ctx.is_authenticated());
            assert_invariant(&ctx);

            ctx.establish(Token::new("t1"), admin()).await.unwrap();
            assert_invariant(&ctx);
            assert_eq!(store.read().await.unwrap(), ctx.current());

            let user = Identity::new("admin", Role::User).unwrap();
            ctx.update_identity(user.clone()).await.unwrap();
            assert_invariant(&ctx);
            assert_eq!(ctx.current().identity(), Some(&user));
            assert_eq!(ctx.current().token(), Some(&Token::new("t1")));
            assert_eq!(store.read().await.unwrap().identity(), Some(&user));

            ctx.terminate().await.unwrap();
            assert_invariant(&ctx);
            assert!(ctx.current().is_empty());
            assert!(store.read().await.unwrap().is_empty());

            // idempotent
            let epoch = ctx.epoch();
            ctx.terminate().await.unwrap();
            ctx.terminate().await.unwrap();
            assert!(ctx.current().is_empty());
            assert_eq!(epoch, ctx.epoch());
        })
    }

    #[test]
    fn update_identity_without_token_fails_loudly() {
        tokio_test::block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let ctx = SessionContext::hydrate(store.clone()).await.unwrap();

            let err = ctx.update_identity(admin()).await.unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::IdentityWithoutToken));
            assert!(ctx.current().is_empty());
            assert!(store.read().await.unwrap().is_empty());
        })
    }

    #[test]
    fn stale_epoch_is_ignored() {
        tokio_test::block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let ctx = SessionContext::hydrate(store).await.unwrap();
            ctx.establish(Token::new("t1"), admin()).await.unwrap();
            let observed = ctx.epoch();

            ctx.terminate().await.unwrap();
            ctx.establish(Token::new("t2"), Identity::new("user", Role::User).unwrap())
                .await
                .unwrap();

            assert!(!ctx.update_identity_at(observed, admin()).await.unwrap());
            assert!(!ctx.terminate_at(observed).await.unwrap());
            assert_eq!(ctx.current().identity().unwrap().username(), "user");

            assert!(ctx.terminate_at(ctx.epoch()).await.unwrap());
            assert!(ctx.current().is_empty());
        })
    }

    #[test]
    fn partial_establish_never_pairs_token_with_old_identity() {
        tokio_test::block_on(async move {
            let inner = MemoryStore::new();
            inner.write_token(&Token::new("t1")).await.unwrap();
            inner.write_identity(&admin()).await.unwrap();
            let store = Arc::new(IdentityWriteFails(inner));

            let ctx = SessionContext::hydrate(store.clone()).await.unwrap();
            let user = Identity::new("user", Role::User).unwrap();
            assert!(ctx.establish(Token::new("t2"), user).await.is_err());

            // Memory keeps the previous session.
            assert_eq!(ctx.current().token(), Some(&Token::new("t1")));

            // Storage holds the new token alone, the identity must be refetched.
            let stored = store.read().await.unwrap();
            assert_eq!(stored.token(), Some(&Token::new("t2")));
            assert!(stored.identity().is_none());
        })
    }

    #[test]
    fn failed_persist_leaves_memory_untouched() {
        tokio_test::block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let ctx = SessionContext::hydrate(store.clone()).await.unwrap();

            store.set_unavailable(true);
            assert!(ctx.establish(Token::new("t1"), admin()).await.is_err());
            assert!(ctx.current().is_empty());

            store.set_unavailable(false);
            ctx.establish(Token::new("t1"), admin()).await.unwrap();

            store.set_unavailable(true);
            assert!(ctx.terminate().await.is_err());
            assert!(ctx.current().is_empty());
        })
    }
}
