//! Application settings loaded from `~/.config/exabrowse/config.toml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = concat!("exabrowse/", env!("CARGO_PKG_VERSION"));

/// Base directory for config, credentials and channel tables.
pub fn config_dir() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("exabrowse")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub summary: SummarySettings,
    #[serde(default)]
    pub mentions: MentionsSettings,
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load from the default location, falling back to defaults if absent.
    pub fn load_default() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

/// Which OpenAI-compatible chat completion service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmPreset {
    #[default]
    Groq,
    Cerebras,
}

impl LlmPreset {
    /// Credential store / environment lookup key.
    pub fn credential_provider(&self) -> &'static str {
        match self {
            LlmPreset::Groq => "groq",
            LlmPreset::Cerebras => "cerebras",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LlmPreset::Groq => "Groq",
            LlmPreset::Cerebras => "Cerebras",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            LlmPreset::Groq => "https://api.groq.com/openai/v1",
            LlmPreset::Cerebras => "https://api.cerebras.ai/v1",
        }
    }

    /// Model used for structured summaries.
    pub fn summary_model(&self) -> &'static str {
        match self {
            LlmPreset::Groq => "llama-3.3-70b-versatile",
            LlmPreset::Cerebras => "gpt-oss-120b",
        }
    }

    /// Model used for interactive chat.
    pub fn chat_model(&self) -> &'static str {
        match self {
            LlmPreset::Groq => "llama-3.1-8b-instant",
            LlmPreset::Cerebras => "llama3.1-8b",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmPreset,
    /// Overrides the preset's endpoint (any OpenAI-compatible base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_model: Option<String>,
}

impl LlmSettings {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.base_url())
    }

    pub fn summary_model(&self) -> &str {
        self.summary_model
            .as_deref()
            .unwrap_or_else(|| self.provider.summary_model())
    }

    pub fn chat_model(&self) -> &str {
        self.chat_model
            .as_deref()
            .unwrap_or_else(|| self.provider.chat_model())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Replaces the built-in system prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Replaces the built-in user prompt; supports `{entity}`, `{days}`, `{context}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MentionsSettings {
    /// Replaces the built-in pool of feed queries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<String>,
}
