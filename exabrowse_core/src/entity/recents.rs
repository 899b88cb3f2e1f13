use super::{Platform, SocialProfile};
use crate::aggregate::{settle_all, AggregateResponse, ChannelPlan, SearchMode};
use crate::error::{BrowseError, Result};
use crate::providers::{SearchProvider, SearchRequest};
use crate::utils::sort_newest_first;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_RECENT_DAYS: u32 = 30;

const RECENTS_PER_PLATFORM: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentsQuery {
    pub entity_name: String,
    #[serde(default)]
    pub social_profiles: Vec<SocialProfile>,
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    DEFAULT_RECENT_DAYS
}

impl RecentsQuery {
    pub fn new(entity_name: impl Into<String>, social_profiles: Vec<SocialProfile>) -> Self {
        Self {
            entity_name: entity_name.into(),
            social_profiles,
            days: DEFAULT_RECENT_DAYS,
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }
}

/// One plan per distinct platform that supports recents, in first-seen order.
///
/// The first profile seen for a platform supplies the username.
pub fn recents_plans(query: &RecentsQuery, today: NaiveDate) -> Vec<ChannelPlan> {
    let start = today - Duration::days(i64::from(query.days));
    let start = start.format("%Y-%m-%d").to_string();
    let name = query.entity_name.trim();

    let mut seen: Vec<Platform> = Vec::new();
    let mut plans = Vec::new();
    for profile in &query.social_profiles {
        let Some(domains) = profile.platform.recents_domains() else {
            continue;
        };
        if seen.contains(&profile.platform) {
            continue;
        }
        seen.push(profile.platform);

        let text = match profile.username.as_deref().filter(|u| !u.is_empty()) {
            Some(user) => format!("from:{user} OR @{user} OR {name}"),
            None => name.to_string(),
        };
        let mut request = SearchRequest::new(text)
            .with("includeDomains", domains.to_vec())
            .with("numResults", RECENTS_PER_PLATFORM)
            .with("text", true)
            .with("startPublishedDate", start.clone());
        SearchMode::Auto.apply(&mut request);

        plans.push(ChannelPlan::Dispatch {
            channel: profile.platform.display_name().to_string(),
            request,
        });
    }
    plans
}

/// Recent content published by an entity on each of its known platforms.
pub struct PlatformRecents {
    provider: Arc<dyn SearchProvider>,
}

impl PlatformRecents {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, query: &RecentsQuery) -> Result<AggregateResponse> {
        if query.entity_name.trim().is_empty() {
            return Err(BrowseError::InvalidInput("Entity name is required".into()));
        }

        let plans = recents_plans(query, Utc::now().date_naive());
        let outcomes = settle_all(self.provider.as_ref(), plans).await;

        let mut response = AggregateResponse::new(SearchMode::Auto);
        for (platform, outcome) in outcomes {
            response.add_outcome(platform, outcome);
        }
        for records in response.results.values_mut() {
            sort_newest_first(records);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn builds_one_plan_per_known_platform() {
        let query = RecentsQuery::new(
            "NASA",
            vec![
                SocialProfile::from_url("https://x.com/NASA"),
                SocialProfile::from_url("https://twitter.com/NASA_Other"),
                SocialProfile::from_url("https://instagram.com/nasa"),
                SocialProfile::from_url("https://youtube.com/watch?v=1"),
            ],
        )
        .with_days(7);
        let plans = recents_plans(&query, date("2024-06-10"));
        assert_eq!(plans.len(), 2);

        let ChannelPlan::Dispatch { channel, request } = &plans[0] else {
            panic!("expected dispatch");
        };
        assert_eq!(channel, "Twitter/X");
        assert_eq!(request.query, "from:NASA OR @NASA OR NASA");
        assert_eq!(request.option("startPublishedDate"), Some(&json!("2024-06-03")));
        assert_eq!(request.option("includeDomains"), Some(&json!(["x.com", "twitter.com"])));
        assert_eq!(request.option("numResults"), Some(&json!(10)));
        assert_eq!(request.option("type"), Some(&json!("auto")));

        let ChannelPlan::Dispatch { channel, request } = &plans[1] else {
            panic!("expected dispatch");
        };
        assert_eq!(channel, "YouTube");
        assert_eq!(request.query, "NASA");
    }

    #[test]
    fn default_window_is_thirty_days() {
        let query: RecentsQuery = serde_json::from_value(json!({
            "entityName": "NASA",
            "socialProfiles": [{"platform": "GitHub", "url": "https://github.com/nasa"}]
        }))
        .unwrap();
        assert_eq!(query.days, DEFAULT_RECENT_DAYS);
        let plans = recents_plans(&query, date("2024-03-31"));
        let ChannelPlan::Dispatch { request, .. } = &plans[0] else {
            panic!("expected dispatch");
        };
        assert_eq!(request.option("startPublishedDate"), Some(&json!("2024-03-01")));
    }
}
