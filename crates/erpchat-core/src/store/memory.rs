//! In-memory conversation store for tests and ephemeral sessions

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{ConversationStore, SessionId, SessionSummary, StoredMessage};
use crate::error::{Error, Result};
use crate::provider::Role;

struct SessionEntry {
    summary: SessionSummary,
    messages: Vec<StoredMessage>,
}

/// Conversation store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryStore {
    fn append(&self, session: &str, role: Role, content: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        let entry = sessions
            .get_mut(session)
            .ok_or_else(|| Error::SessionNotFound(session.to_string()))?;
        let now = Utc::now();
        entry.messages.push(StoredMessage {
            role,
            content: content.to_string(),
            created_at: now,
        });
        entry.summary.updated_at = now;
        entry.summary.message_count = entry.messages.len();
        Ok(())
    }

    fn recent(&self, session: &str, limit: usize) -> Result<Vec<StoredMessage>> {
        let sessions = self.sessions.read();
        let entry = sessions
            .get(session)
            .ok_or_else(|| Error::SessionNotFound(session.to_string()))?;
        let skip = entry.messages.len().saturating_sub(limit);
        Ok(entry.messages[skip..].to_vec())
    }

    fn clear(&self, session: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        let entry = sessions
            .get_mut(session)
            .ok_or_else(|| Error::SessionNotFound(session.to_string()))?;
        entry.messages.clear();
        entry.summary.message_count = 0;
        entry.summary.updated_at = Utc::now();
        Ok(())
    }

    fn active_session_for(&self, user: &str) -> Result<Option<SessionId>> {
        let sessions = self.sessions.read();
        let mut active: Vec<&SessionEntry> = sessions
            .values()
            .filter(|e| e.summary.user == user && e.summary.is_active)
            .collect();
        active.sort_by(|a, b| b.summary.updated_at.cmp(&a.summary.updated_at));
        Ok(active.first().map(|e| e.summary.id.clone()))
    }

    fn create_session(&self, user: &str, label: &str) -> Result<SessionId> {
        let mut sessions = self.sessions.write();
        for entry in sessions.values_mut() {
            if entry.summary.user == user {
                entry.summary.is_active = false;
            }
        }
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        sessions.insert(
            id.clone(),
            SessionEntry {
                summary: SessionSummary {
                    id: id.clone(),
                    user: user.to_string(),
                    label: label.to_string(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                    message_count: 0,
                },
                messages: Vec::new(),
            },
        );
        Ok(id)
    }

    fn list_sessions(&self, user: &str) -> Result<Vec<SessionSummary>> {
        let sessions = self.sessions.read();
        let mut summaries: Vec<SessionSummary> = sessions
            .values()
            .filter(|e| e.summary.user == user)
            .map(|e| e.summary.clone())
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    fn delete_session(&self, session: &str) -> Result<()> {
        self.sessions.write().remove(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_then_recent_round_trip() {
        let store = MemoryStore::new();
        let session = store.create_session("alice", "Chat").unwrap();
        store.append(&session, Role::Human, "hello").unwrap();

        let messages = store.recent(&session, 1).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Human);
        assert_eq!(messages[0].content, "hello");
    }

    #[test]
    fn test_recent_is_oldest_first() {
        let store = MemoryStore::new();
        let session = store.create_session("alice", "Chat").unwrap();
        store.append(&session, Role::Human, "first").unwrap();
        store.append(&session, Role::Ai, "second").unwrap();
        store.append(&session, Role::Human, "third").unwrap();

        let messages = store.recent(&session, 2).unwrap();
        assert_eq!(messages[0].content, "second");
        assert_eq!(messages[1].content, "third");
    }

    #[test]
    fn test_clear_then_recent_is_empty() {
        let store = MemoryStore::new();
        let session = store.create_session("alice", "Chat").unwrap();
        store.append(&session, Role::Human, "hello").unwrap();
        store.clear(&session).unwrap();

        for n in [0, 1, 10] {
            assert!(store.recent(&session, n).unwrap().is_empty());
        }
    }

    #[test]
    fn test_create_session_deactivates_previous() {
        let store = MemoryStore::new();
        let first = store.create_session("alice", "One").unwrap();
        let second = store.create_session("alice", "Two").unwrap();

        assert_ne!(first, second);
        assert_eq!(store.active_session_for("alice").unwrap(), Some(second));
    }

    #[test]
    fn test_sessions_are_per_user() {
        let store = MemoryStore::new();
        store.create_session("alice", "A").unwrap();
        let bob = store.create_session("bob", "B").unwrap();

        assert_eq!(store.active_session_for("bob").unwrap(), Some(bob));
        assert_eq!(store.list_sessions("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_session() {
        let store = MemoryStore::new();
        let session = store.create_session("alice", "Chat").unwrap();
        store.delete_session(&session).unwrap();
        assert!(store.recent(&session, 5).is_err());
        assert!(store.active_session_for("alice").unwrap().is_none());
    }
}
