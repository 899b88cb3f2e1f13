//! LLM summaries of what has recently been said about an entity.

use crate::config::SummarySettings;
use crate::error::{BrowseError, Result};
use crate::providers::{ChatMessage, CompletionProvider, CompletionRequest, SearchRecord};
use crate::utils::{parse_timestamp, sort_newest_first, truncate_chars};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Most recent records included in the prompt.
pub const MAX_CONTEXT_RECORDS: usize = 30;

/// Characters of page text kept per record.
pub const SNIPPET_CHARS: usize = 200;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1500;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert at analyzing social media and news content to identify themes, trends, and key quotes. You extract insights about what people or companies are discussing.";

pub const DEFAULT_USER_PROMPT: &str = r#"Analyze the following content about "{entity}" from the last {days} days. Provide:

1. **Hottest Topics**: Identify the 3-5 most frequently discussed themes with approximate mention counts
2. **Key Quotes**: Extract 3-5 notable quotes from {entity} (if available in the content)
3. **Theme Evolution**: Show how themes have changed over time (e.g., "Last 7 days", "7-14 days ago", etc.)

Content to analyze:
{context}

Respond in JSON format:
{
  "hottestTopics": [
    {"theme": "Topic name", "count": 5, "period": "Last 7 days"}
  ],
  "keyQuotes": ["Quote 1", "Quote 2"],
  "themeTimeline": [
    {"period": "Last 7 days", "themes": ["Theme 1", "Theme 2"]},
    {"period": "7-14 days ago", "themes": ["Theme 3"]}
  ]
}"#;

/// System and user prompt with `{entity}`, `{days}` and `{context}` slots.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            user: DEFAULT_USER_PROMPT.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn from_settings(settings: &SummarySettings) -> Self {
        let defaults = Self::default();
        Self {
            system: settings.system_prompt.clone().unwrap_or(defaults.system),
            user: settings.user_prompt.clone().unwrap_or(defaults.user),
        }
    }

    /// Fill the user prompt. `{context}` goes in last so page text is never
    /// rescanned for placeholders.
    pub fn render_user(&self, entity: &str, days: u32, context: &str) -> String {
        self.user
            .replace("{entity}", entity)
            .replace("{days}", &days.to_string())
            .replace("{context}", context)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotTopic {
    pub theme: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemePeriod {
    pub period: String,
    #[serde(default)]
    pub themes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionSummary {
    pub hottest_topics: Vec<HotTopic>,
    pub key_quotes: Vec<String>,
    pub theme_timeline: Vec<ThemePeriod>,
}

impl MentionSummary {
    /// Read the model's JSON reply. A missing or malformed field becomes an
    /// empty list without affecting the other two.
    pub fn from_reply(reply: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(reply.trim()).map_err(|e| {
            BrowseError::provider("Summary", format!("reply is not valid JSON: {}", e))
        })?;
        Ok(Self {
            hottest_topics: lenient_list(&value, "hottestTopics"),
            key_quotes: lenient_list(&value, "keyQuotes"),
            theme_timeline: lenient_list(&value, "themeTimeline"),
        })
    }
}

fn lenient_list<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Caller input for a summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    pub results: BTreeMap<String, Vec<SearchRecord>>,
    pub entity_name: String,
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    crate::entity::DEFAULT_RECENT_DAYS
}

/// Numbered, newest-first digest of at most [`MAX_CONTEXT_RECORDS`] records.
pub fn build_context(results: &BTreeMap<String, Vec<SearchRecord>>) -> String {
    let mut all: Vec<SearchRecord> = results.values().flatten().cloned().collect();
    sort_newest_first(&mut all);

    all.iter()
        .take(MAX_CONTEXT_RECORDS)
        .enumerate()
        .map(|(idx, record)| {
            let date = record
                .published_date
                .as_deref()
                .and_then(parse_timestamp)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "Unknown date".to_string());
            let snippet = record
                .text
                .as_deref()
                .map(|t| truncate_chars(t, SNIPPET_CHARS))
                .unwrap_or_default();
            format!("[{}] {} - {}\n{}", idx + 1, date, record.title, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct MentionSummarizer {
    provider: Arc<dyn CompletionProvider>,
    template: PromptTemplate,
}

impl MentionSummarizer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_template(provider, PromptTemplate::default())
    }

    pub fn with_template(provider: Arc<dyn CompletionProvider>, template: PromptTemplate) -> Self {
        Self { provider, template }
    }

    pub fn build_request(&self, input: &SummaryInput) -> CompletionRequest {
        let context = build_context(&input.results);
        CompletionRequest {
            model: None,
            messages: vec![
                ChatMessage::system(self.template.system.clone()),
                ChatMessage::user(self.template.render_user(
                    &input.entity_name,
                    input.days,
                    &context,
                )),
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            json_object: true,
        }
    }

    pub async fn summarize(&self, input: &SummaryInput) -> Result<MentionSummary> {
        if input.results.is_empty() {
            return Err(BrowseError::InvalidInput("No results to analyze".into()));
        }

        let request = self.build_request(input);
        tracing::debug!(
            provider = self.provider.name(),
            entity = %input.entity_name,
            "Requesting mention summary"
        );
        let reply = self.provider.complete(&request).await?;
        MentionSummary::from_reply(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped(records: Vec<SearchRecord>) -> BTreeMap<String, Vec<SearchRecord>> {
        let mut map = BTreeMap::new();
        map.insert("News".to_string(), records);
        map
    }

    #[test]
    fn context_lists_newest_first() {
        let results = grouped(vec![
            SearchRecord::new("undated", "u0"),
            SearchRecord::new("january", "u1").with_published_date("2024-01-01"),
            SearchRecord::new("june", "u2")
                .with_published_date("2024-06-01T08:00:00Z")
                .with_text("a".repeat(500)),
        ]);
        let context = build_context(&results);
        let blocks: Vec<&str> = context.split("\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("[1] 2024-06-01 - june\n"));
        assert_eq!(blocks[0].lines().nth(1).unwrap().len(), SNIPPET_CHARS);
        assert!(blocks[1].starts_with("[2] 2024-01-01 - january"));
        assert!(blocks[2].trim_start().starts_with("[3] Unknown date - undated"));
    }

    #[test]
    fn context_caps_record_count() {
        let records = (0..45)
            .map(|i| SearchRecord::new(format!("t{}", i), format!("u{}", i)))
            .collect();
        let context = build_context(&grouped(records));
        assert_eq!(context.matches("Unknown date").count(), MAX_CONTEXT_RECORDS);
    }

    #[test]
    fn template_substitutes_placeholders() {
        let rendered = PromptTemplate::default().render_user("NASA", 14, "CTX {entity}");
        assert!(rendered.starts_with("Analyze the following content about \"NASA\" from the last 14 days."));
        assert!(rendered.contains("CTX {entity}"));
        assert!(rendered.contains("\"hottestTopics\""));
    }

    #[test]
    fn reply_fields_degrade_independently() {
        let summary = MentionSummary::from_reply(
            r#"{"hottestTopics": "oops", "keyQuotes": ["We launched"], "themeTimeline": [{"period": "Last 7 days", "themes": ["Launch"]}, 42]}"#,
        )
        .unwrap();
        assert!(summary.hottest_topics.is_empty());
        assert_eq!(summary.key_quotes, vec!["We launched"]);
        assert_eq!(summary.theme_timeline.len(), 1);
        assert_eq!(summary.theme_timeline[0].themes, vec!["Launch"]);
    }

    #[test]
    fn non_json_reply_is_provider_error() {
        let err = MentionSummary::from_reply("Sure! Here are the themes").unwrap_err();
        assert!(matches!(err, BrowseError::Provider { .. }));
    }

    #[test]
    fn summary_serializes_camel_case() {
        let value = serde_json::to_value(MentionSummary::default()).unwrap();
        assert!(value.get("hottestTopics").is_some());
        assert!(value.get("keyQuotes").is_some());
        assert!(value.get("themeTimeline").is_some());
    }
}
