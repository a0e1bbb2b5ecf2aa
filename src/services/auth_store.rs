use crate::domain::session::{AuthSession, SessionUser};
use crate::error::Result;
use crate::storage::SessionStorage;
use std::sync::Arc;
use tokio::sync::watch;

/// Single source of truth for the signed-in session.
///
/// Cloning the handle shares the same state. Reads are synchronous snapshots;
/// writes update memory first and then persist through the injected
/// [`SessionStorage`]. Until [`AuthStore::hydrate`] finishes, [`AuthStore::state`]
/// reflects nothing about earlier runs and callers must not act on it.
#[derive(Clone, Debug)]
pub struct AuthStore {
    session: Arc<watch::Sender<Option<AuthSession>>>,
    hydrated: Arc<watch::Sender<bool>>,
    storage: Arc<dyn SessionStorage>,
}

impl AuthStore {
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (session, _) = watch::channel(None);
        let (hydrated, _) = watch::channel(false);
        Self { session: Arc::new(session), hydrated: Arc::new(hydrated), storage }
    }

    /// Loads the persisted session into memory and raises the hydration flag.
    ///
    /// An unreadable record hydrates as signed out rather than failing.
    #[tracing::instrument(skip(self))]
    pub async fn hydrate(&self) {
        self.hydrated.send_replace(false);

        let loaded = match self.storage.load().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted session");
                None
            }
        };

        tracing::debug!(signed_in = loaded.is_some(), "Session hydrated");
        self.session.send_replace(loaded);
        self.hydrated.send_replace(true);
    }

    #[must_use]
    pub fn has_hydrated(&self) -> bool {
        *self.hydrated.borrow()
    }

    pub async fn wait_until_hydrated(&self) {
        let mut rx = self.hydrated.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|&hydrated| hydrated).await;
    }

    /// Current session snapshot.
    #[must_use]
    pub fn state(&self) -> Option<AuthSession> {
        self.session.borrow().clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.session.borrow().as_ref().map(|s| s.access_token.clone())
    }

    /// Change notifications for consumers that re-render on session updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.session.subscribe()
    }

    /// Replaces the whole session.
    ///
    /// # Errors
    /// Returns an error if persisting fails; the in-memory session is updated regardless.
    pub async fn set_auth(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: SessionUser,
    ) -> Result<()> {
        let session = AuthSession::new(access_token, refresh_token, user);
        self.session.send_replace(Some(session.clone()));
        self.storage.save(&session).await
    }

    /// Swaps in a refreshed access token, keeping the refresh token and user.
    /// Returns `false` without touching anything when signed out.
    ///
    /// # Errors
    /// Returns an error if persisting fails; the in-memory session is updated regardless.
    pub async fn replace_access_token(&self, access_token: impl Into<String>) -> Result<bool> {
        let access_token = access_token.into();
        let mut updated = None;
        self.session.send_if_modified(|current| match current {
            Some(session) => {
                *session = session.with_access_token(access_token);
                updated = Some(session.clone());
                true
            }
            None => false,
        });

        match updated {
            Some(session) => self.storage.save(&session).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Signs out: clears memory and the persisted record.
    ///
    /// # Errors
    /// Returns an error if the persisted record cannot be removed.
    pub async fn clear_auth(&self) -> Result<()> {
        self.session.send_replace(None);
        self.storage.remove().await
    }
}
