//! Platform classification and profile usernames.

use serde::{Deserialize, Serialize};
use url::Url;

/// A content platform recognised from a URL hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Twitter/X")]
    TwitterX,
    LinkedIn,
    YouTube,
    Reddit,
    Medium,
    GitHub,
    TikTok,
    Instagram,
    Facebook,
    Other,
}

/// Hostname suffixes per platform, checked in order.
const HOSTS: &[(Platform, &[&str])] = &[
    (Platform::TwitterX, &["twitter.com", "x.com"]),
    (Platform::LinkedIn, &["linkedin.com"]),
    (Platform::YouTube, &["youtube.com", "youtu.be"]),
    (Platform::Reddit, &["reddit.com"]),
    (Platform::Medium, &["medium.com"]),
    (Platform::GitHub, &["github.com"]),
    (Platform::TikTok, &["tiktok.com"]),
    (Platform::Instagram, &["instagram.com"]),
    (Platform::Facebook, &["facebook.com"]),
];

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

impl Platform {
    /// Classify by hostname. Unparseable URLs are [`Platform::Other`].
    pub fn from_url(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Platform::Other;
        };
        let Some(host) = parsed.host_str() else {
            return Platform::Other;
        };
        let host = host.to_ascii_lowercase();
        HOSTS
            .iter()
            .find(|(_, domains)| domains.iter().any(|d| host_matches(&host, d)))
            .map(|(platform, _)| *platform)
            .unwrap_or(Platform::Other)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::TwitterX => "Twitter/X",
            Platform::LinkedIn => "LinkedIn",
            Platform::YouTube => "YouTube",
            Platform::Reddit => "Reddit",
            Platform::Medium => "Medium",
            Platform::GitHub => "GitHub",
            Platform::TikTok => "TikTok",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Other => "Other",
        }
    }

    /// Domains searched for an entity's own recent posts, if the platform
    /// supports that.
    pub fn recents_domains(&self) -> Option<&'static [&'static str]> {
        match self {
            Platform::TwitterX => Some(&["x.com", "twitter.com"]),
            Platform::LinkedIn => Some(&["linkedin.com"]),
            Platform::YouTube => Some(&["youtube.com"]),
            Platform::GitHub => Some(&["github.com"]),
            Platform::Medium => Some(&["medium.com"]),
            Platform::Reddit => Some(&["reddit.com"]),
            _ => None,
        }
    }

    /// Pull a username out of a profile URL when the path shape is known.
    pub fn extract_username(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let first = segments.first().copied();
        let second = segments.get(1).copied();

        let name = match self {
            Platform::TwitterX | Platform::GitHub => first,
            Platform::LinkedIn => match first {
                Some("in") | Some("company") => second,
                _ => None,
            },
            Platform::YouTube => match first {
                Some(seg) if seg.starts_with('@') => Some(&seg[1..]),
                Some("c") | Some("user") => second,
                _ => None,
            },
            Platform::Reddit => match first {
                Some("u") | Some("user") => second,
                _ => None,
            },
            Platform::Medium => first.and_then(|seg| seg.strip_prefix('@')),
            _ => None,
        }?;

        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
