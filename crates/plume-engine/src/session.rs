//! Session persistence: cookies, storage and lightweight metadata, keyed by
//! platform + session name. Deleting a session file is logout.

use chrono::{DateTime, Utc};
use plume_core::protocol::{Cookie, StorageState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub platform: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    /// The authenticated account's handle, used as the actor for live
    /// duplicate checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub storage: StorageState,
    pub metadata: SessionMetadata,
}

pub struct SessionStore {
    base_dir: PathBuf,
}

impl SessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".plume")
            .join("sessions")
    }

    fn path(&self, platform: &str, name: &str) -> PathBuf {
        self.base_dir.join(format!("{platform}-{name}.json"))
    }

    /// Persist a session, overwriting any previous one. Write-then-rename
    /// so a partial write never corrupts an existing session.
    pub async fn save(
        &self,
        platform: &str,
        name: &str,
        record: &SessionRecord,
    ) -> Result<(), SessionError> {
        fs::create_dir_all(&self.base_dir).await?;
        let path = self.path(platform, name);
        let json = serde_json::to_string_pretty(record)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "Saved session");
        Ok(())
    }

    /// Load a session. Missing or corrupt files are a normal logged-out
    /// state, reported as `None`.
    pub async fn load(&self, platform: &str, name: &str) -> Option<SessionRecord> {
        let path = self.path(platform, name);
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unparsable session file, treating as logged out");
                None
            }
        }
    }

    /// Metadata only, without handing out the auth payload.
    pub async fn metadata(&self, platform: &str, name: &str) -> Option<SessionMetadata> {
        self.load(platform, name).await.map(|r| r.metadata)
    }

    pub async fn delete(&self, platform: &str, name: &str) -> Result<(), SessionError> {
        let path = self.path(platform, name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(e)),
        }
    }

    pub fn session_path(&self, platform: &str, name: &str) -> PathBuf {
        self.path(platform, name)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
