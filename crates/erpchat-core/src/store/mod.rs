//! Conversation store
//!
//! Persists the per-session message log and the per-user active-session
//! flag. Appends are durable before the call returns; ordering within a
//! session is the append order. The agent and the turn API are the only
//! consumers.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::provider::{Message, Role};

/// Unique identifier for a session
pub type SessionId = String;

/// One persisted message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// View as a provider message
    pub fn to_message(&self) -> Message {
        Message { role: self.role, content: self.content.clone() }
    }
}

/// Session metadata for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub user: String,
    pub label: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Persistent conversation log keyed by session
pub trait ConversationStore: Send + Sync {
    /// Append a message; durable before returning
    fn append(&self, session: &str, role: Role, content: &str) -> Result<()>;

    /// The most recent `limit` messages, oldest first
    fn recent(&self, session: &str, limit: usize) -> Result<Vec<StoredMessage>>;

    /// Remove all messages from a session, keeping the session itself
    fn clear(&self, session: &str) -> Result<()>;

    /// The user's active session, if any
    fn active_session_for(&self, user: &str) -> Result<Option<SessionId>>;

    /// Create a session for the user and make it the active one
    /// (previously active sessions are deactivated, last writer wins)
    fn create_session(&self, user: &str, label: &str) -> Result<SessionId>;

    /// All sessions for the user, most recently updated first
    fn list_sessions(&self, user: &str) -> Result<Vec<SessionSummary>>;

    /// Delete a session and its messages
    fn delete_session(&self, session: &str) -> Result<()>;
}

/// Default label for a freshly created session
pub fn default_session_label(now: DateTime<Utc>) -> String {
    format!("Chat {}", now.format("%Y-%m-%d %H:%M"))
}
