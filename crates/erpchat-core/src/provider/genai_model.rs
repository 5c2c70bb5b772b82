//! genai-backed completion model
//!
//! Uses streaming execution and accumulates chunks into a single message,
//! which avoids idle-connection timeouts on long completions.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatStreamEvent};
use genai::resolver::{AuthData, AuthResolver};
use genai::Client;
use genai::WebConfig;
use tracing::debug;

use super::{CompletionModel, Message, Role};
use crate::error::{Error, Result};

/// Default model, matching the original deployment
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Production completion model over the genai client
pub struct GenAiModel {
    client: Client,
    model: String,
    temperature: f64,
}

impl GenAiModel {
    /// Timeout for LLM API requests
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

    fn web_config() -> WebConfig {
        WebConfig::default()
            .with_timeout(Self::REQUEST_TIMEOUT)
            .with_connect_timeout(Duration::from_secs(30))
    }

    /// Create a model bound to an explicit API key
    pub fn with_api_key(api_key: &str, model: Option<&str>) -> Self {
        let api_key = api_key.to_string();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden| -> std::result::Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(api_key.clone())))
            },
        );

        let client = Client::builder()
            .with_web_config(Self::web_config())
            .with_auth_resolver(auth_resolver)
            .build();

        Self {
            client,
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionModel for GenAiModel {
    async fn complete(&self, messages: &[Message]) -> Result<Message> {
        let mut chat_req = ChatRequest::default();
        for msg in messages {
            chat_req = match msg.role {
                Role::System => chat_req.append_message(ChatMessage::system(&msg.content)),
                Role::Human => chat_req.append_message(ChatMessage::user(&msg.content)),
                Role::Ai => chat_req.append_message(ChatMessage::assistant(&msg.content)),
            };
        }

        let options = ChatOptions::default().with_temperature(self.temperature);

        debug!(model = %self.model, message_count = messages.len(), "LLM request");

        let stream_res = self
            .client
            .exec_chat_stream(&self.model, chat_req, Some(&options))
            .await
            .map_err(|e| Error::Provider(format!("GenAI error: {:?}", e)))?;

        let mut content = String::new();
        let mut stream = stream_res.stream;

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    content.push_str(&chunk.content);
                }
                Ok(ChatStreamEvent::End(_)) => break,
                Ok(_) => {
                    // Reasoning, tool-call and signature events carry nothing
                    // for a plain-text completion
                }
                Err(e) => {
                    tracing::error!(error = ?e, model = %self.model, "LLM stream error");
                    return Err(Error::Provider(format!("GenAI stream error: {:?}", e)));
                }
            }
        }

        Ok(Message::ai(content))
    }
}
