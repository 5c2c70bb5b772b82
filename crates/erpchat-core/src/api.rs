//! Turn-level service surface
//!
//! The embedding application talks to the assistant through [`ChatService`].
//! Every operation absorbs internal failures and returns a normal-shaped
//! value; nothing here propagates an error to the caller.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::agent::Agent;
use crate::backend::DataBackend;
use crate::charts::{chart_from_answer, chart_title_for, chart_type_for, wants_chart, ChartSpec};
use crate::provider::CompletionModel;
use crate::store::{
    default_session_label, ConversationStore, SessionId, SessionSummary, StoredMessage,
};
use crate::tools::standard_registry;

/// Response for one chat turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub success: bool,
    pub message: String,
    pub session_id: SessionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartSpec>,
}

impl TurnResponse {
    fn failure(message: impl Into<String>, session_id: SessionId) -> Self {
        Self { success: false, message: message.into(), session_id, chart_data: None }
    }
}

/// Facade over model, store and backend for the embedding application
pub struct ChatService {
    model: Arc<dyn CompletionModel>,
    store: Arc<dyn ConversationStore>,
    backend: Arc<dyn DataBackend>,
}

impl ChatService {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        store: Arc<dyn ConversationStore>,
        backend: Arc<dyn DataBackend>,
    ) -> Self {
        Self { model, store, backend }
    }

    /// Run one turn for the user, optionally continuing a known session.
    ///
    /// Chart extraction runs only when the message asks for a
    /// visualization, and its failure never fails the turn.
    pub async fn send_message(
        &self,
        user: &str,
        message: &str,
        session_id: Option<&str>,
    ) -> TurnResponse {
        if message.trim().is_empty() {
            return TurnResponse::failure(
                "Message cannot be empty",
                session_id.unwrap_or_default().to_string(),
            );
        }

        let session = match self.resolve_session(user, session_id) {
            Ok(session) => session,
            Err(e) => {
                error!(user, error = %e, "failed to resolve session");
                return TurnResponse::failure(format!("Error: {}", e), String::new());
            }
        };

        let agent = Agent::with_session(
            user,
            session.clone(),
            self.model.clone(),
            self.store.clone(),
            standard_registry(self.backend.clone()),
        );
        let outcome = agent.chat(message).await;

        let chart_data = if outcome.success && wants_chart(message) {
            chart_from_answer(
                &outcome.message,
                chart_type_for(message),
                chart_title_for(message),
            )
        } else {
            None
        };

        TurnResponse {
            success: outcome.success,
            message: outcome.message,
            session_id: session,
            chart_data,
        }
    }

    fn resolve_session(
        &self,
        user: &str,
        session_id: Option<&str>,
    ) -> crate::error::Result<SessionId> {
        if let Some(id) = session_id {
            return Ok(id.to_string());
        }
        match self.store.active_session_for(user)? {
            Some(id) => Ok(id),
            None => self
                .store
                .create_session(user, &default_session_label(Utc::now())),
        }
    }

    /// Messages of a session, oldest first. Empty on any failure or when
    /// the user has no session yet.
    pub fn get_history(
        &self,
        user: &str,
        session_id: Option<&str>,
        limit: usize,
    ) -> Vec<StoredMessage> {
        let session = match session_id {
            Some(id) => id.to_string(),
            None => match self.store.active_session_for(user) {
                Ok(Some(id)) => id,
                Ok(None) => return Vec::new(),
                Err(e) => {
                    error!(user, error = %e, "failed to look up active session");
                    return Vec::new();
                }
            },
        };
        self.store.recent(&session, limit).unwrap_or_else(|e| {
            error!(session = %session, error = %e, "failed to load history");
            Vec::new()
        })
    }

    /// The user's sessions, most recently updated first
    pub fn list_sessions(&self, user: &str) -> Vec<SessionSummary> {
        self.store.list_sessions(user).unwrap_or_else(|e| {
            error!(user, error = %e, "failed to list sessions");
            Vec::new()
        })
    }

    /// Create a session and make it active
    pub fn create_session(&self, user: &str, name: Option<&str>) -> Option<SessionId> {
        let label = match name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => default_session_label(Utc::now()),
        };
        match self.store.create_session(user, &label) {
            Ok(id) => Some(id),
            Err(e) => {
                error!(user, error = %e, "failed to create session");
                None
            }
        }
    }

    /// Wipe a session's messages; reports whether it worked
    pub fn clear_history(&self, session_id: &str) -> bool {
        match self.store.clear(session_id) {
            Ok(()) => true,
            Err(e) => {
                error!(session = session_id, error = %e, "failed to clear history");
                false
            }
        }
    }

    /// Delete a session entirely; reports whether it worked
    pub fn delete_session(&self, session_id: &str) -> bool {
        match self.store.delete_session(session_id) {
            Ok(()) => true,
            Err(e) => {
                error!(session = session_id, error = %e, "failed to delete session");
                false
            }
        }
    }
}
