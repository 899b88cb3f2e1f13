//! Channel tables.
//!
//! A channel turns a free-text query into one provider request: which domains
//! to search, which content category, how many results and whether to fetch
//! page text. Tables group channels under a name with a default channel.

use super::types::SearchMode;
use crate::providers::SearchRequest;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

// ============================================================================
// Default Values
// ============================================================================

/// Default results per channel
pub const DEFAULT_NUM_RESULTS: u32 = 10;

/// Table used by plain searches
pub const SEARCH_TABLE: &str = "search";

/// Table used for an entity's platform-by-platform content
pub const PLATFORMS_TABLE: &str = "platforms";

// ============================================================================
// ChannelConfig
// ============================================================================

/// Provider parameters for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Restrict results to these domains (empty = no restriction)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,

    /// Provider content category, e.g. `news` or `research paper`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Maximum records requested (default: 10)
    #[serde(default = "default_num_results")]
    pub num_results: u32,

    /// Ask the provider for extracted page text
    #[serde(default)]
    pub full_text: bool,
}

fn default_num_results() -> u32 {
    DEFAULT_NUM_RESULTS
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            include_domains: Vec::new(),
            category: None,
            num_results: DEFAULT_NUM_RESULTS,
            full_text: false,
        }
    }
}

impl ChannelConfig {
    pub fn new(num_results: u32) -> Self {
        Self {
            num_results,
            ..Self::default()
        }
    }

    pub fn domains(mut self, domains: &[&str]) -> Self {
        self.include_domains = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_text(mut self) -> Self {
        self.full_text = true;
        self
    }

    /// Build the provider request for `query`.
    ///
    /// Order: mode parameters, domains, category, limit, text flag, then
    /// `overrides` last so callers can replace any of the above.
    pub fn request_for(
        &self,
        query: &str,
        mode: SearchMode,
        overrides: Option<&Map<String, Value>>,
    ) -> SearchRequest {
        let mut request = SearchRequest::new(query);
        mode.apply(&mut request);
        if !self.include_domains.is_empty() {
            request.set("includeDomains", self.include_domains.clone());
        }
        if let Some(category) = &self.category {
            request.set("category", category.as_str());
        }
        request.set("numResults", self.num_results);
        if self.full_text {
            request.set("text", true);
        }
        if let Some(overrides) = overrides {
            request.merge(overrides);
        }
        request
    }
}

// ============================================================================
// ChannelTable
// ============================================================================

/// A named set of channels.
///
/// Tables can be:
/// - Built-in (`search`, `platforms`)
/// - User-defined (in ~/.config/exabrowse/channels.yaml), shadowing built-ins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTable {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Channel used when a query names none
    pub default_channel: String,

    pub channels: BTreeMap<String, ChannelConfig>,
}

impl ChannelTable {
    pub fn new(name: impl Into<String>, default_channel: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default_channel: default_channel.into(),
            channels: BTreeMap::new(),
        }
    }

    pub fn with_channel(mut self, id: impl Into<String>, config: ChannelConfig) -> Self {
        self.channels.insert(id.into(), config);
        self
    }

    /// Get a built-in table by name.
    pub fn get_builtin(name: &str) -> Option<Self> {
        BUILTIN_TABLES.iter().find(|t| t.name == name).cloned()
    }

    /// List all built-in tables.
    pub fn list_builtin() -> &'static [ChannelTable] {
        &BUILTIN_TABLES
    }

    /// The built-in `search` table.
    pub fn search() -> Self {
        Self::get_builtin(SEARCH_TABLE).unwrap_or_else(|| Self::new(SEARCH_TABLE, "general"))
    }

    /// The built-in `platforms` table.
    pub fn platforms() -> Self {
        Self::get_builtin(PLATFORMS_TABLE).unwrap_or_else(|| Self::new(PLATFORMS_TABLE, "News"))
    }

    pub fn get(&self, id: &str) -> Option<&ChannelConfig> {
        self.channels.get(id)
    }

    pub fn channel_ids(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Requested ids in first-seen order without repeats, or the default
    /// channel when none were requested.
    pub fn resolve_channels(&self, requested: &[String]) -> Vec<String> {
        if requested.is_empty() {
            return vec![self.default_channel.clone()];
        }
        let mut seen = HashSet::new();
        requested
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }
}

// ============================================================================
// Built-in Tables
// ============================================================================

static BUILTIN_TABLES: Lazy<Vec<ChannelTable>> = Lazy::new(|| {
    vec![
        ChannelTable {
            name: SEARCH_TABLE.to_string(),
            description: Some("General web search split by result type".to_string()),
            default_channel: "general".to_string(),
            channels: BTreeMap::new(),
        }
        .with_channel("general", ChannelConfig::new(10).with_text())
        .with_channel(
            "video",
            ChannelConfig::new(6).domains(&["youtube.com", "vimeo.com"]),
        )
        .with_channel(
            "social",
            ChannelConfig::new(8)
                .domains(&["x.com", "twitter.com", "reddit.com", "linkedin.com"])
                .with_text(),
        )
        .with_channel("news", ChannelConfig::new(8).category("news").with_text())
        .with_channel(
            "developer",
            ChannelConfig::new(6)
                .domains(&["github.com", "stackoverflow.com", "dev.to"])
                .with_text(),
        )
        .with_channel(
            "academic",
            ChannelConfig::new(6).category("research paper").with_text(),
        )
        .with_channel("company", ChannelConfig::new(5).category("company")),
        ChannelTable {
            name: PLATFORMS_TABLE.to_string(),
            description: Some("An entity's presence across content platforms".to_string()),
            default_channel: "News".to_string(),
            channels: BTreeMap::new(),
        }
        .with_channel("YouTube", ChannelConfig::new(10).domains(&["youtube.com"]).with_text())
        .with_channel(
            "Twitter/X",
            ChannelConfig::new(10)
                .domains(&["x.com", "twitter.com"])
                .with_text(),
        )
        .with_channel("LinkedIn", ChannelConfig::new(10).domains(&["linkedin.com"]).with_text())
        .with_channel("News", ChannelConfig::new(10).category("news").with_text())
        .with_channel("Reddit", ChannelConfig::new(10).domains(&["reddit.com"]).with_text())
        .with_channel("Medium", ChannelConfig::new(10).domains(&["medium.com"]).with_text())
        .with_channel("GitHub", ChannelConfig::new(5).domains(&["github.com"]).with_text()),
    ]
});

// ============================================================================
// ChannelStore
// ============================================================================

/// Storage for user-defined channel tables, kept as YAML at
/// `~/.config/exabrowse/channels.yaml`.
pub struct ChannelStore {
    path: PathBuf,
}

impl ChannelStore {
    pub fn new_default() -> Self {
        Self {
            path: crate::config::config_dir().join("channels.yaml"),
        }
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load all user-defined tables. A missing or unreadable file is empty.
    pub fn load_all(&self) -> HashMap<String, ChannelTable> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(tables) => tables,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Ignoring malformed channel file");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    /// Load a table by name, user tables first, then built-ins.
    pub fn load(&self, name: &str) -> Option<ChannelTable> {
        if let Some(table) = self.load_all().get(name).cloned() {
            return Some(table);
        }
        ChannelTable::get_builtin(name)
    }

    pub fn save(&self, table: &ChannelTable) -> Result<(), ChannelStoreError> {
        let mut tables = self.load_all();
        tables.insert(table.name.clone(), table.clone());
        self.write_all(&tables)
    }

    /// Returns `Ok(true)` if a user table was removed. Built-ins stay.
    pub fn delete(&self, name: &str) -> Result<bool, ChannelStoreError> {
        let mut tables = self.load_all();
        let existed = tables.remove(name).is_some();
        if existed {
            self.write_all(&tables)?;
        }
        Ok(existed)
    }

    /// User tables plus built-ins they don't shadow, sorted by name.
    pub fn list_all(&self) -> Vec<ChannelTable> {
        let mut tables: Vec<ChannelTable> = self.load_all().into_values().collect();
        for builtin in ChannelTable::list_builtin() {
            if !tables.iter().any(|t| t.name == builtin.name) {
                tables.push(builtin.clone());
            }
        }
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }

    fn write_all(&self, tables: &HashMap<String, ChannelTable>) -> Result<(), ChannelStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ChannelStoreError::Io(e.to_string()))?;
        }
        let content = serde_yaml::to_string(tables)
            .map_err(|e| ChannelStoreError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| ChannelStoreError::Io(e.to_string()))?;
        Ok(())
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "exabrowse-channels-{}-{}.yaml",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn builtin_search_table() {
        let table = ChannelTable::search();
        assert_eq!(table.default_channel, "general");
        for id in ["general", "video", "social", "news", "developer", "academic", "company"] {
            assert!(table.get(id).is_some(), "channel '{}' should exist", id);
        }
        assert!(!table.get("video").unwrap().full_text);
        assert_eq!(table.get("news").unwrap().category.as_deref(), Some("news"));
    }

    #[test]
    fn builtin_platforms_table() {
        let table = ChannelTable::platforms();
        assert_eq!(table.channels.len(), 7);
        assert_eq!(table.get("GitHub").unwrap().num_results, 5);
        assert_eq!(
            table.get("Twitter/X").unwrap().include_domains,
            vec!["x.com", "twitter.com"]
        );
        assert!(table.channels.values().all(|c| c.full_text));
    }

    #[test]
    fn resolve_channels_drops_repeats() {
        let table = ChannelTable::search();
        let requested: Vec<String> = ["video", "news", "video", "podcasts", "news"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            table.resolve_channels(&requested),
            vec!["video", "news", "podcasts"]
        );
        assert_eq!(table.resolve_channels(&[]), vec!["general"]);
    }

    #[test]
    fn request_shape_follows_config() {
        let config = ChannelConfig::new(6).domains(&["youtube.com"]);
        let request = config.request_for("bees", SearchMode::Auto, None);
        assert_eq!(request.query, "bees");
        assert_eq!(request.option("type"), Some(&json!("auto")));
        assert_eq!(request.option("includeDomains"), Some(&json!(["youtube.com"])));
        assert_eq!(request.option("numResults"), Some(&json!(6)));
        assert!(request.option("text").is_none());
        assert!(request.option("category").is_none());
    }

    #[test]
    fn overrides_win_over_channel_defaults() {
        let config = ChannelConfig::new(8).category("news").with_text();
        let overrides = json!({"numResults": 2, "category": "pdf"});
        let request =
            config.request_for("q", SearchMode::Fast, Some(overrides.as_object().unwrap()));
        assert_eq!(request.option("numResults"), Some(&json!(2)));
        assert_eq!(request.option("category"), Some(&json!("pdf")));
        assert_eq!(request.option("livecrawl"), Some(&json!("never")));
        assert_eq!(request.option("text"), Some(&json!(true)));
    }

    #[test]
    fn resolve_defaults_to_default_channel() {
        let table = ChannelTable::search();
        assert_eq!(table.resolve_channels(&[]), vec!["general"]);
        assert_eq!(
            table.resolve_channels(&["video".to_string()]),
            vec!["video"]
        );
    }

    #[test]
    fn yaml_defaults_fill_missing_fields() {
        let yaml = r#"
name: mine
default_channel: docs
channels:
  docs:
    include_domains: [docs.rs]
"#;
        let table: ChannelTable = serde_yaml::from_str(yaml).unwrap();
        let docs = table.get("docs").unwrap();
        assert_eq!(docs.num_results, DEFAULT_NUM_RESULTS);
        assert!(!docs.full_text);
    }

    #[test]
    fn store_user_table_shadows_builtin() {
        let path = temp_path("shadow");
        let store = ChannelStore::new(path.clone());

        let custom = ChannelTable::new(SEARCH_TABLE, "docs")
            .with_channel("docs", ChannelConfig::new(3).domains(&["docs.rs"]));
        store.save(&custom).unwrap();

        let loaded = store.load(SEARCH_TABLE).unwrap();
        assert_eq!(loaded.default_channel, "docs");
        assert!(loaded.get("video").is_none());

        let names: Vec<String> = store.list_all().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec![PLATFORMS_TABLE, SEARCH_TABLE]);

        assert!(store.delete(SEARCH_TABLE).unwrap());
        assert!(!store.delete(SEARCH_TABLE).unwrap());
        assert_eq!(store.load(SEARCH_TABLE).unwrap().default_channel, "general");

        let _ = std::fs::remove_file(path);
    }
}
