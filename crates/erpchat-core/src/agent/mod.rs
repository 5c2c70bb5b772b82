//! Dialogue orchestrator
//!
//! Drives one conversational turn: grounding prompt, model call, optional
//! tool dispatch, second model call with the tool result, sanitation, and
//! persistence. Failures never escape `chat`; they come back as an
//! apologetic outcome with `success: false`.

mod parser;
mod system_prompt;

pub use parser::{parse_tool_call, ParsedToolCall, ToolInput};
pub use system_prompt::{strip_banned_phrases, SystemPrompt};

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::provider::{CompletionModel, Message, Role};
use crate::store::{default_session_label, ConversationStore, SessionId};
use crate::tools::{invoke, ToolRegistry};

/// Messages loaded from the store at turn start
const HISTORY_LOAD_LIMIT: usize = 10;
/// Of those, how many are injected into the prompt
const HISTORY_INJECT_LIMIT: usize = 5;

/// Result of one conversational turn
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub success: bool,
    pub message: String,
}

/// The conversational agent for one user and session
pub struct Agent {
    user: String,
    session_id: SessionId,
    model: Arc<dyn CompletionModel>,
    store: Arc<dyn ConversationStore>,
    registry: ToolRegistry,
    prompt: SystemPrompt,
}

impl Agent {
    /// Build an agent on the user's active session, creating one if none
    /// exists.
    pub fn new(
        user: impl Into<String>,
        model: Arc<dyn CompletionModel>,
        store: Arc<dyn ConversationStore>,
        registry: ToolRegistry,
    ) -> Result<Self> {
        let user = user.into();
        let session_id = match store.active_session_for(&user)? {
            Some(id) => id,
            None => store.create_session(&user, &default_session_label(Utc::now()))?,
        };
        Ok(Self::with_session(user, session_id, model, store, registry))
    }

    /// Build an agent bound to a known session
    pub fn with_session(
        user: impl Into<String>,
        session_id: SessionId,
        model: Arc<dyn CompletionModel>,
        store: Arc<dyn ConversationStore>,
        registry: ToolRegistry,
    ) -> Self {
        let user = user.into();
        let prompt = SystemPrompt::new(&user);
        Self { user, session_id, model, store, registry, prompt }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Run one turn. Never fails: internal errors are logged, persisted as
    /// the answer, and reported with `success: false`.
    pub async fn chat(&self, message: &str) -> ChatOutcome {
        match self.run_turn(message).await {
            Ok(answer) => ChatOutcome { success: true, message: answer },
            Err(e) => {
                error!(user = %self.user, session = %self.session_id, error = %e, "turn failed");
                let text = format!("I encountered an error: {}", e);
                self.persist_exchange(message, &text);
                ChatOutcome { success: false, message: text }
            }
        }
    }

    async fn run_turn(&self, message: &str) -> Result<String> {
        let history = self.store.recent(&self.session_id, HISTORY_LOAD_LIMIT)?;

        let mut messages = vec![Message::system(self.prompt.build(&self.registry))];
        let skip = history.len().saturating_sub(HISTORY_INJECT_LIMIT);
        for stored in &history[skip..] {
            messages.push(stored.to_message());
        }
        messages.push(Message::human(message));

        let response = self.model.complete(&messages).await?;
        debug!(session = %self.session_id, "first model call complete");

        let answer = match parse_tool_call(&response.content) {
            Some(call) => {
                info!(session = %self.session_id, tool = %call.name, "tool requested");
                let tool_result = invoke(&self.registry, &call.name, &call.input).await;

                messages.push(Message::ai(&response.content));
                messages.push(Message::human(format!(
                    "Tool result:\n{}\n\nPlease provide your final answer based on this data.",
                    tool_result
                )));

                let final_response = self.model.complete(&messages).await?;
                final_response.content
            }
            None => response.content,
        };
        let answer = strip_banned_phrases(&answer);

        self.store.append(&self.session_id, Role::Human, message)?;
        self.store.append(&self.session_id, Role::Ai, &answer)?;

        Ok(answer)
    }

    /// Best-effort persistence of a failed turn
    fn persist_exchange(&self, message: &str, answer: &str) {
        if let Err(e) = self
            .store
            .append(&self.session_id, Role::Human, message)
            .and_then(|_| self.store.append(&self.session_id, Role::Ai, answer))
        {
            error!(session = %self.session_id, error = %e, "failed to persist turn");
        }
    }

    /// Wipe the session's message log
    pub fn clear_history(&self) -> Result<()> {
        self.store.clear(&self.session_id)
    }
}
