//! Session-scoped storage.
//!
//! A small string key/value store kept in one JSON file, used to hand the
//! document text and preferences from the Q&A step to the assessment screen.
//! It lives for one learning session: `clear` ends it. There is no locking;
//! one flow drives one store at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::model::Preferences;

pub const DOCUMENT_TEXT_KEY: &str = "documentText";
pub const PREFERENCES_KEY: &str = "preferences";

/// Why staged state could not be read back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has no `{0}` entry")]
    Missing(&'static str),
    #[error("session entry `{key}` is unreadable: {reason}")]
    Corrupt { key: &'static str, reason: String },
}

/// What the assessment screen needs from the Q&A step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSession {
    pub document_text: String,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    id: Uuid,
    started_at: DateTime<Utc>,
    #[serde(default)]
    items: BTreeMap<String, String>,
}

impl SessionFile {
    fn fresh() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            items: BTreeMap::new(),
        }
    }
}

/// File-backed session storage. Every write goes straight to disk.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    file: SessionFile,
}

impl SessionStore {
    /// Open the store at `path`, starting a new session if none exists.
    pub fn open(path: &Path) -> Result<Self> {
        let file = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read session from {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse session {}", path.display()))?
        } else {
            SessionFile::fresh()
        };
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn id(&self) -> Uuid {
        self.file.id
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.file.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.file.items.insert(key.to_string(), value.into());
        self.save()
    }

    /// End the session: drop every entry and the file itself.
    pub fn clear(&mut self) -> Result<()> {
        self.file = SessionFile::fresh();
        Self::discard(&self.path)?;
        Ok(())
    }

    /// Delete the session file at `path` without reading it, so a file that
    /// no longer parses can still be removed. Returns whether a file existed.
    pub fn discard(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove session {}", path.display()))?;
        Ok(true)
    }

    /// Stage document text and preferences for the assessment screen.
    pub fn stage(&mut self, document_text: &str, preferences: &Preferences) -> Result<()> {
        let prefs = serde_json::to_string(preferences).context("failed to serialize preferences")?;
        self.file
            .items
            .insert(DOCUMENT_TEXT_KEY.to_string(), document_text.to_string());
        self.file.items.insert(PREFERENCES_KEY.to_string(), prefs);
        debug!(session = %self.file.id, bytes = document_text.len(), "session staged");
        self.save()
    }

    /// Read staged state back. Preferences are checked first, since the
    /// assessment cannot be generated without them.
    pub fn rehydrate(&self) -> Result<StagedSession, SessionError> {
        let raw = self
            .get_item(PREFERENCES_KEY)
            .ok_or(SessionError::Missing(PREFERENCES_KEY))?;
        let preferences: Preferences =
            serde_json::from_str(raw).map_err(|e| SessionError::Corrupt {
                key: PREFERENCES_KEY,
                reason: e.to_string(),
            })?;
        let document_text = self
            .get_item(DOCUMENT_TEXT_KEY)
            .ok_or(SessionError::Missing(DOCUMENT_TEXT_KEY))?
            .to_string();
        Ok(StagedSession {
            document_text,
            preferences,
        })
    }

    fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.file).context("failed to serialize session")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write session to {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> Preferences {
        Preferences {
            content_format: vec!["Concise bullet points".into()],
            assessment_style: vec!["Multiple-choice quizzes".into()],
        }
    }

    #[test]
    fn stage_then_rehydrate_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::open(&path).unwrap();
        store.stage("Photosynthesis...", &prefs()).unwrap();
        let id = store.id();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.id(), id);
        let staged = reopened.rehydrate().unwrap();
        assert_eq!(staged.document_text, "Photosynthesis...");
        assert_eq!(staged.preferences, prefs());
        assert!(reopened
            .get_item(PREFERENCES_KEY)
            .unwrap()
            .contains("contentFormat"));
    }

    #[test]
    fn missing_preferences_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(&dir.path().join("s.json")).unwrap();
        store.set_item(DOCUMENT_TEXT_KEY, "text").unwrap();
        assert_eq!(
            store.rehydrate().unwrap_err(),
            SessionError::Missing(PREFERENCES_KEY)
        );
    }

    #[test]
    fn corrupt_preferences_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::open(&dir.path().join("s.json")).unwrap();
        store.set_item(PREFERENCES_KEY, "not json").unwrap();
        assert!(matches!(
            store.rehydrate().unwrap_err(),
            SessionError::Corrupt { key: PREFERENCES_KEY, .. }
        ));
    }

    #[test]
    fn clear_removes_file_and_starts_over() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let mut store = SessionStore::open(&path).unwrap();
        store.stage("doc", &prefs()).unwrap();
        let old_id = store.id();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert_ne!(store.id(), old_id);
        assert!(store.get_item(DOCUMENT_TEXT_KEY).is_none());
    }

    #[test]
    fn unreadable_file_can_be_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, "{ truncated").unwrap();

        assert!(SessionStore::open(&path).is_err());
        assert!(SessionStore::discard(&path).unwrap());
        assert!(!path.exists());
        assert!(!SessionStore::discard(&path).unwrap());

        let fresh = SessionStore::open(&path).unwrap();
        assert!(fresh.get_item(PREFERENCES_KEY).is_none());
    }
}
