use crate::domain::session::AuthSession;
use crate::error::Result;
use crate::storage::{SESSION_KEY, SessionStorage};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keeps the session record in a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()), err(level = "warn"))]
    async fn load(&self) -> Result<Option<AuthSession>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut document: Map<String, Value> = serde_json::from_slice(&bytes)?;
        match document.remove(SESSION_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(record) => Ok(Some(serde_json::from_value(record)?)),
        }
    }

    #[tracing::instrument(skip(self, session), fields(path = %self.path.display()), err)]
    async fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut document = Map::new();
        document.insert(SESSION_KEY.to_string(), serde_json::to_value(session)?);
        let bytes = serde_json::to_vec_pretty(&document)?;

        // Write-then-rename so a crash never leaves a torn record behind.
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()), err)]
    async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionUser;

    fn session() -> AuthSession {
        AuthSession::new("T1", "R1", SessionUser { id: "u1".into(), role: "admin".into(), email: Some("a@b.com".into()) })
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested/session.json"));

        storage.save(&session()).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(session()));

        storage.remove().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
        storage.remove().await.unwrap();
    }

    #[tokio::test]
    async fn test_record_lives_under_fixed_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileSessionStorage::new(&path).save(&session()).await.unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw[SESSION_KEY]["accessToken"], "T1");
        assert_eq!(raw[SESSION_KEY]["refreshToken"], "R1");
        assert_eq!(raw[SESSION_KEY]["user"]["id"], "u1");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(FileSessionStorage::new(&path).load().await.is_err());
    }
}
