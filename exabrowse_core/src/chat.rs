//! Conversational Q&A about a topic or page.

use crate::error::{BrowseError, Result};
use crate::providers::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::utils::truncate_chars;
use serde::Deserialize;
use std::sync::Arc;

pub const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide clear, concise, and accurate responses.";

/// Upper bound on the context block appended to the system prompt.
pub const MAX_CONTEXT_CHARS: usize = 6000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatInput {
    pub messages: Vec<ChatMessage>,
    /// Page text or topic notes the assistant should ground its answers in.
    #[serde(default)]
    pub context: Option<String>,
}

pub struct TopicChat {
    provider: Arc<dyn CompletionProvider>,
}

impl TopicChat {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn system_prompt(context: Option<&str>) -> String {
        match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(ctx) => format!(
                "{}\n\nUse the following context when it is relevant:\n{}",
                CHAT_SYSTEM_PROMPT,
                truncate_chars(ctx, MAX_CONTEXT_CHARS)
            ),
            None => CHAT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn build_request(input: &ChatInput) -> CompletionRequest {
        let mut messages = Vec::with_capacity(input.messages.len() + 1);
        messages.push(ChatMessage::system(Self::system_prompt(
            input.context.as_deref(),
        )));
        messages.extend(input.messages.iter().cloned());
        CompletionRequest {
            messages,
            ..CompletionRequest::default()
        }
    }

    /// The whole reply from a single completion call. Replies are not streamed.
    pub async fn reply(&self, input: &ChatInput) -> Result<String> {
        if input.messages.is_empty() {
            return Err(BrowseError::InvalidInput("Messages are required".into()));
        }
        self.provider.complete(&Self::build_request(input)).await
    }
}
