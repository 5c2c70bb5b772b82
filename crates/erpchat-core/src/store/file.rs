//! Disk-backed conversation store
//!
//! One JSON file per session under the sessions directory. Every append
//! rewrites the session file synchronously, so a returned append is on
//! disk. Concurrent turns on different sessions touch different files;
//! the active-session flag is last-writer-wins across files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::{ConversationStore, SessionId, SessionSummary, StoredMessage};
use crate::error::{Error, Result};
use crate::provider::Role;

/// Serialized session file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    id: SessionId,
    user: String,
    label: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<StoredMessage>,
}

impl SessionFile {
    fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            user: self.user.clone(),
            label: self.label.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.messages.len(),
        }
    }
}

/// Conversation store writing one JSON file per session
pub struct FileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles on session files
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at the given directory, creating it as needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    /// Open at the platform default location
    pub fn open_default() -> Result<Self> {
        let dir = crate::config::StoreConfig::default().sessions_dir();
        Self::open(dir)
    }

    fn path_for(&self, session: &str) -> PathBuf {
        self.dir.join(format!("{}.json", session))
    }

    fn load(&self, session: &str) -> Result<SessionFile> {
        let path = self.path_for(session);
        if !path.exists() {
            return Err(Error::SessionNotFound(session.to_string()));
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, file: &SessionFile) -> Result<()> {
        let path = self.path_for(&file.id);
        let json = serde_json::to_string_pretty(file)?;
        std::fs::write(&path, json)?;
        Ok(())
    }

    fn load_all(&self) -> Vec<SessionFile> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match read_session_file(&path) {
                    Ok(file) => files.push(file),
                    Err(e) => warn!("Failed to read session {:?}: {}", path, e),
                }
            }
        }
        files
    }
}

fn read_session_file(path: &Path) -> Result<SessionFile> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

impl ConversationStore for FileStore {
    fn append(&self, session: &str, role: Role, content: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut file = self.load(session)?;
        let now = Utc::now();
        file.messages.push(StoredMessage {
            role,
            content: content.to_string(),
            created_at: now,
        });
        file.updated_at = now;
        self.save(&file)
    }

    fn recent(&self, session: &str, limit: usize) -> Result<Vec<StoredMessage>> {
        let file = self.load(session)?;
        let skip = file.messages.len().saturating_sub(limit);
        Ok(file.messages[skip..].to_vec())
    }

    fn clear(&self, session: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut file = self.load(session)?;
        file.messages.clear();
        file.updated_at = Utc::now();
        self.save(&file)
    }

    fn active_session_for(&self, user: &str) -> Result<Option<SessionId>> {
        let mut active: Vec<SessionFile> = self
            .load_all()
            .into_iter()
            .filter(|f| f.user == user && f.is_active)
            .collect();
        active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(active.first().map(|f| f.id.clone()))
    }

    fn create_session(&self, user: &str, label: &str) -> Result<SessionId> {
        let _guard = self.write_lock.lock();
        for mut file in self.load_all() {
            if file.user == user && file.is_active {
                file.is_active = false;
                self.save(&file)?;
            }
        }

        let now = Utc::now();
        let file = SessionFile {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
            label: label.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };
        self.save(&file)?;
        Ok(file.id)
    }

    fn list_sessions(&self, user: &str) -> Result<Vec<SessionSummary>> {
        let mut summaries: Vec<SessionSummary> = self
            .load_all()
            .into_iter()
            .filter(|f| f.user == user)
            .map(|f| f.summary())
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    fn delete_session(&self, session: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let path = self.path_for(session);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_survives_reopen() {
        let dir = tempdir().unwrap();
        let session = {
            let store = FileStore::open(dir.path()).unwrap();
            let session = store.create_session("alice", "Chat").unwrap();
            store.append(&session, Role::Human, "persist me").unwrap();
            session
        };

        let store = FileStore::open(dir.path()).unwrap();
        let messages = store.recent(&session, 10).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "persist me");
    }

    #[test]
    fn test_active_flag_moves_to_new_session() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.create_session("alice", "One").unwrap();
        let second = store.create_session("alice", "Two").unwrap();
        assert_eq!(store.active_session_for("alice").unwrap(), Some(second));
    }

    #[test]
    fn test_clear_keeps_session() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let session = store.create_session("alice", "Chat").unwrap();
        store.append(&session, Role::Ai, "answer").unwrap();
        store.clear(&session).unwrap();

        assert!(store.recent(&session, 5).unwrap().is_empty());
        assert_eq!(store.list_sessions("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_session_removes_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let session = store.create_session("alice", "Chat").unwrap();
        store.delete_session(&session).unwrap();
        assert!(store.recent(&session, 5).is_err());
    }

    #[test]
    fn test_unknown_session_append_fails() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.append("nope", Role::Human, "x").is_err());
    }
}
