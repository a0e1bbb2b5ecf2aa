use crate::domain::session::AuthSession;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

pub mod file;

pub use file::FileSessionStorage;

/// Key the session record is stored under.
pub const SESSION_KEY: &str = "admin-auth";

/// Durable home of the session record.
#[async_trait]
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    /// Returns the persisted session, or `None` if nothing was stored.
    ///
    /// # Errors
    /// Returns an error if the record exists but cannot be read or parsed.
    async fn load(&self) -> Result<Option<AuthSession>>;

    /// # Errors
    /// Returns an error if the record cannot be written.
    async fn save(&self, session: &AuthSession) -> Result<()>;

    /// Removing a record that does not exist is not an error.
    ///
    /// # Errors
    /// Returns an error if the record exists but cannot be removed.
    async fn remove(&self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    record: Mutex<Option<AuthSession>>,
}

impl MemorySessionStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: AuthSession) -> Self {
        Self { record: Mutex::new(Some(session)) }
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> Result<Option<AuthSession>> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, session: &AuthSession) -> Result<()> {
        *self.record.lock().await = Some(session.clone());
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        *self.record.lock().await = None;
        Ok(())
    }
}
