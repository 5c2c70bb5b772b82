//! LLM provider abstraction
//!
//! The agent reaches the language model through the [`CompletionModel`]
//! trait: a single "generate a completion given a message sequence"
//! operation with no session state held by the provider. The production
//! implementation ([`GenAiModel`]) sits on the genai framework; tests
//! substitute scripted models.

mod genai_model;

pub use genai_model::GenAiModel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Role of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "human",
            Role::Ai => "ai",
        }
    }
}

/// Parse a role string; unknown roles default to Human
pub fn parse_role(s: &str) -> Role {
    match s.to_lowercase().as_str() {
        "system" => Role::System,
        "ai" | "assistant" => Role::Ai,
        _ => Role::Human,
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self { role: Role::Human, content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self { role: Role::Ai, content: content.into() }
    }
}

/// A completion service: ordered messages in, one free-text message out.
///
/// Implementations must be stateless across calls: the agent passes the
/// full context explicitly on every invocation and may call twice per turn.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<Message>;
}
