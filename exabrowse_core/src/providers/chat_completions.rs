//! OpenAI-compatible `/chat/completions` client (Groq, Cerebras, ...).

use super::{CompletionProvider, CompletionRequest};
use crate::config::{HttpSettings, LlmSettings};
use crate::credentials::{env_var_for, resolve_api_key, CredentialStore};
use crate::error::{BrowseError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    display_name: &'static str,
}

impl ChatCompletionsClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
        http: &HttpSettings,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| BrowseError::Internal(e.to_string()))?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.into(),
            display_name: "LLM",
        })
    }

    /// Build the summary-model client for the configured preset.
    pub fn for_summaries(
        store: &dyn CredentialStore,
        llm: &LlmSettings,
        http: &HttpSettings,
    ) -> Result<Self> {
        Self::from_settings(store, llm, http, llm.summary_model())
    }

    /// Build the chat-model client for the configured preset.
    pub fn for_chat(
        store: &dyn CredentialStore,
        llm: &LlmSettings,
        http: &HttpSettings,
    ) -> Result<Self> {
        Self::from_settings(store, llm, http, llm.chat_model())
    }

    fn from_settings(
        store: &dyn CredentialStore,
        llm: &LlmSettings,
        http: &HttpSettings,
        model: &str,
    ) -> Result<Self> {
        let provider = llm.provider.credential_provider();
        let key = resolve_api_key(store, provider).ok_or_else(|| {
            BrowseError::Configuration(format!(
                "{} not configured",
                env_var_for(provider).unwrap_or("API key")
            ))
        })?;
        let mut client = Self::new(key, llm.base_url(), model, http)?;
        client.display_name = llm.provider.display_name();
        Ok(client)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| BrowseError::Configuration(e.to_string()))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(self.default_model.as_str()),
            "messages": request.messages,
        });
        if let Some(t) = request.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(max) = request.max_tokens {
            body["max_tokens"] = json!(max);
        }
        if request.json_object {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn extract_reply(value: &Value) -> Option<String> {
    value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[async_trait]
impl CompletionProvider for ChatCompletionsClient {
    fn name(&self) -> &'static str {
        self.display_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_body(request);
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(BrowseError::HttpRequest)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BrowseError::provider(
                self.display_name,
                format!("{} - {}", status.as_u16(), text),
            ));
        }

        let value: Value = resp.json().await.map_err(BrowseError::HttpRequest)?;
        extract_reply(&value).ok_or_else(|| {
            BrowseError::provider(
                self.display_name,
                format!("No response from {} API", self.display_name),
            )
        })
    }
}
