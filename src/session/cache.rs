use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::CategoryRecord;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to write session cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode session cache: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A category list as fetched, stamped with when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCategories {
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<CategoryRecord>,
}

/// Per-session state shared by every command that needs categories.
///
/// Screens that need the taxonomy (tree view, article composer) go through
/// this instead of refetching. The list is replaced wholesale on
/// [`store`](Self::store) and dropped on [`invalidate`](Self::invalidate),
/// which callers must invoke after anything that changes categories.
#[derive(Debug, Clone)]
pub struct SessionContext {
    categories: Option<CachedCategories>,
    ttl: Duration,
}

impl SessionContext {
    /// A `ttl` of zero or less means cached categories are never fresh.
    pub fn new(ttl: Duration) -> Self {
        Self {
            categories: None,
            ttl,
        }
    }

    pub fn with_ttl_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    /// Cached categories, if present and still fresh at `now`.
    pub fn categories_at(&self, now: DateTime<Utc>) -> Option<&[CategoryRecord]> {
        let cached = self.categories.as_ref()?;
        let age = now.signed_duration_since(cached.fetched_at);
        // Future timestamps (clock moved back) count as stale
        if age < Duration::zero() || age >= self.ttl {
            tracing::debug!(age_secs = age.num_seconds(), "Cached categories are stale");
            return None;
        }
        Some(cached.records.as_slice())
    }

    pub fn categories(&self) -> Option<&[CategoryRecord]> {
        self.categories_at(Utc::now())
    }

    pub fn store(&mut self, records: Vec<CategoryRecord>) {
        self.store_at(records, Utc::now());
    }

    pub fn store_at(&mut self, records: Vec<CategoryRecord>, fetched_at: DateTime<Utc>) {
        tracing::debug!(count = records.len(), "Caching categories");
        self.categories = Some(CachedCategories {
            fetched_at,
            records,
        });
    }

    pub fn invalidate(&mut self) {
        if self.categories.take().is_some() {
            tracing::debug!("Category cache invalidated");
        }
    }

    /// Restore a session from disk.
    ///
    /// A missing file gives an empty session. So does an unreadable or
    /// corrupt one, after a warning: the cache is only an optimization.
    pub fn load(path: &Path, ttl: Duration) -> Self {
        let mut session = Self::new(ttl);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return session,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read session cache, ignoring");
                return session;
            }
        };

        match serde_json::from_str::<CachedCategories>(&content) {
            Ok(cached) => session.categories = Some(cached),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt session cache, ignoring");
            }
        }
        session
    }

    /// Persist the cached list, or remove the file when nothing is cached.
    ///
    /// Writes to a temp file and renames it into place so a crash never
    /// leaves a half-written cache.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let Some(cached) = &self.categories else {
            return match std::fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        };

        let json = serde_json::to_vec(cached)?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}
