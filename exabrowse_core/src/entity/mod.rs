//! Entity lookup: who a free-text query refers to, and where they publish.
//!
//! Resolution runs three lookups in turn: encyclopedia summary, official
//! website, then the profile fan-out. Each one that fails leaves its field
//! empty instead of failing the whole entity.

mod platform;
mod recents;
mod socials;

pub use platform::Platform;
pub use recents::{recents_plans, PlatformRecents, RecentsQuery, DEFAULT_RECENT_DAYS};
pub use socials::PlatformSocials;

use crate::aggregate::{settle_all, ChannelOutcome, ChannelPlan};
use crate::error::{BrowseError, Result};
use crate::providers::{SearchProvider, SearchRecord, SearchRequest};
use crate::utils::truncate_chars;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum characters kept from the encyclopedia summary.
pub const DESCRIPTION_MAX_CHARS: usize = 300;

const WIKIPEDIA_TITLE_SUFFIX: &str = " - Wikipedia";

/// Per-platform profile lookups: query suffix and the domains searched.
const PROFILE_LOOKUPS: &[(&str, &[&str])] = &[
    ("twitter profile", &["twitter.com", "x.com"]),
    ("linkedin profile", &["linkedin.com"]),
    ("youtube channel", &["youtube.com"]),
    ("github profile", &["github.com"]),
    ("instagram profile", &["instagram.com"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProfile {
    pub platform: Platform,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl SocialProfile {
    /// Classify `url` and extract its username.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let platform = Platform::from_url(&url);
        let username = platform.extract_username(&url);
        Self {
            platform,
            url,
            username,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub social_profiles: Vec<SocialProfile>,
}

pub struct EntityResolver {
    provider: Arc<dyn SearchProvider>,
}

impl EntityResolver {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub async fn resolve(&self, query: &str) -> Result<Entity> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BrowseError::InvalidInput("Query is required".into()));
        }

        let summary = self.encyclopedia_summary(query).await;
        let website = self.official_website(query).await;
        let social_profiles = self.social_profiles(query).await;

        let (name, description) = summary.unwrap_or_else(|| (query.to_string(), String::new()));
        Ok(Entity {
            name,
            description,
            website,
            social_profiles,
        })
    }

    /// Name and first paragraph from the best Wikipedia hit.
    async fn encyclopedia_summary(&self, query: &str) -> Option<(String, String)> {
        let request = SearchRequest::new(format!("{} wikipedia page", query))
            .with("type", "keyword")
            .with("includeDomains", vec!["wikipedia.org"])
            .with("numResults", 1)
            .with("text", true);

        let hit = self.first_hit(&request, "wikipedia").await?;
        let description = hit
            .text
            .as_deref()
            .and_then(|t| t.split("\n\n").next())
            .map(|p| truncate_chars(p, DESCRIPTION_MAX_CHARS))
            .unwrap_or_default();
        let name = if hit.title.is_empty() {
            query.to_string()
        } else {
            hit.title.replace(WIKIPEDIA_TITLE_SUFFIX, "")
        };
        Some((name, description))
    }

    async fn official_website(&self, query: &str) -> Option<String> {
        let request = SearchRequest::new(format!("{} official website", query))
            .with("type", "auto")
            .with("numResults", 1);
        self.first_hit(&request, "website").await.map(|r| r.url)
    }

    async fn social_profiles(&self, query: &str) -> Vec<SocialProfile> {
        let plans = PROFILE_LOOKUPS
            .iter()
            .map(|(suffix, domains)| ChannelPlan::Dispatch {
                channel: suffix.to_string(),
                request: SearchRequest::new(format!("{} {}", query, suffix))
                    .with("type", "keyword")
                    .with("includeDomains", domains.to_vec())
                    .with("numResults", 1),
            })
            .collect();

        settle_all(self.provider.as_ref(), plans)
            .await
            .into_iter()
            .filter_map(|(lookup, outcome)| match outcome {
                ChannelOutcome::Records(records) => records.into_iter().next(),
                ChannelOutcome::Failed(e) => {
                    tracing::warn!(lookup = %lookup, error = %e, "Profile lookup failed");
                    None
                }
            })
            .map(|record| SocialProfile::from_url(record.url))
            .collect()
    }

    async fn first_hit(&self, request: &SearchRequest, step: &str) -> Option<SearchRecord> {
        match self.provider.search(request).await {
            Ok(records) => records.into_iter().next(),
            Err(e) => {
                tracing::warn!(step, error = %e, "Entity lookup step failed");
                None
            }
        }
    }
}
