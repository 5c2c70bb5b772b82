//! ERP Chat Core - conversational assistant for ERP data
//!
//! This crate provides the core functionality for the ERP chat assistant:
//! - LLM provider abstraction with a genai-backed implementation
//! - Tool system for read-only ERP data queries
//! - Marker-based tool dispatch and the two-phase dialogue loop
//! - Conversation persistence with per-user active sessions
//! - Best-effort chart extraction from answers

pub mod agent;
pub mod api;
pub mod backend;
pub mod charts;
pub mod config;
pub mod error;
pub mod formatting;
pub mod provider;
pub mod store;
pub mod tools;

pub use agent::{parse_tool_call, Agent, ChatOutcome, ParsedToolCall, SystemPrompt, ToolInput};
pub use api::{ChatService, TurnResponse};
pub use backend::{DataBackend, DocField, DocMeta, Document, Filter, FilterOp, MemoryBackend, Query};
pub use charts::{chart_from_answer, wants_chart, ChartSpec, Dataset};
pub use config::{Config, ConfigManager, ModelConfig, StoreConfig};
pub use error::{BackendError, Error, Result, ToolError};
pub use provider::{CompletionModel, GenAiModel, Message, Role};
pub use store::{
    ConversationStore, FileStore, MemoryStore, SessionId, SessionSummary, StoredMessage,
};
pub use tools::{invoke, standard_registry, Tool, ToolParam, ToolRegistry, ToolSpec};

pub use formatting::{fmt_count, fmt_money, truncate_str};
