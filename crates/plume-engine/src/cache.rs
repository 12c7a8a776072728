//! Persistent de-duplication ledger of actions already taken.
//!
//! One pretty-printed JSON file per platform so operators can inspect,
//! hand-edit, or delete it to reset state. A missing or corrupt file must
//! never block a run; it only removes duplicate prevention for that run.

use chrono::{DateTime, Utc};
use plume_core::ContentId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content_id: ContentId,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub count: usize,
    pub entries: Vec<CacheEntry>,
}

pub struct ActionCache {
    path: PathBuf,
    entries: Vec<CacheEntry>,
}

impl ActionCache {
    pub fn new(cache_dir: &Path, platform: &str) -> Self {
        Self {
            path: cache_dir.join(format!("{platform}-commented-posts.json")),
            entries: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache file into memory. Missing or unparsable files degrade
    /// to an empty cache; corruption is treated as "no cache".
    pub async fn load(&mut self) -> usize {
        self.entries = match fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<Vec<CacheEntry>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Unparsable cache file, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read cache file, starting empty");
                Vec::new()
            }
        };
        debug!(count = self.entries.len(), "Loaded action cache");
        self.entries.len()
    }

    /// Atomically overwrite the cache file with the full entry list.
    /// Write failures are logged and swallowed.
    pub async fn save(&self) {
        if let Err(e) = self.try_save().await {
            warn!(path = %self.path.display(), error = %e, "Failed to write cache file, skipping");
        }
    }

    async fn try_save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub fn has_acted(&self, id: &ContentId) -> bool {
        self.entries.iter().any(|e| &e.content_id == id)
    }

    /// Append an entry unless one already exists for this content id, then
    /// persist. Returns whether a new entry was written.
    pub async fn record_action(&mut self, id: &ContentId, actor: &str, reason: &str) -> bool {
        if self.has_acted(id) {
            return false;
        }
        self.entries.push(CacheEntry {
            content_id: id.clone(),
            actor: actor.to_string(),
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.save().await;
        true
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            count: self.entries.len(),
            entries: self.entries.clone(),
        }
    }
}
