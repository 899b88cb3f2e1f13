//! Rotating feed of community posts from X and Reddit.

use crate::aggregate::{settle_all, ChannelOutcome, ChannelPlan, SearchMode};
use crate::providers::{SearchProvider, SearchRecord, SearchRequest};
use crate::utils::truncate_chars;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

pub const DEFAULT_FEED_QUERIES: &[&str] = &[
    "AI for climate change conservation tracking planet",
    "we need better tools to monitor endangered species environment",
    "building AI to help save the planet conservation tech",
];

const RESULTS_PER_SOURCE: u32 = 8;
const SNIPPET_CHARS: usize = 200;

pub const X_PLATFORM_LABEL: &str = "𝕏";
pub const REDDIT_PLATFORM_LABEL: &str = "Reddit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub platform: String,
    pub handle: String,
    pub text: String,
    pub url: String,
}

static MARKDOWN_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"#{1,6}\s*", ""),
        (r"\*\*(.+?)\*\*", "$1"),
        (r"\*(.+?)\*", "$1"),
        (r"__(.+?)__", "$1"),
        (r"_(.+?)_", "$1"),
        (r"~~(.+?)~~", "$1"),
        (r"`(.+?)`", "$1"),
        (r"\[([^\]]+)\]\([^)]+\)", "$1"),
        (r"!\[([^\]]*)\]\([^)]+\)", ""),
        (r"(?m)^[-*+]\s+", ""),
        (r"(?m)^\d+\.\s+", ""),
        (r"(?m)^>\s*", ""),
        (r"---+", ""),
        (r"\n{2,}", " "),
        (r"\n", " "),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Flatten markdown into a single line of plain text.
pub fn strip_markdown(text: &str) -> String {
    let mut out = text.to_string();
    for (re, replacement) in MARKDOWN_RULES.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out.trim().to_string()
}

/// `@<first path segment>` of an X/Twitter URL.
pub fn x_handle(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next().map(str::to_string))
        })
        .filter(|seg| !seg.is_empty())
        .map(|seg| format!("@{}", seg))
        .unwrap_or_else(|| "@unknown".to_string())
}

/// `r/<subreddit>` of a Reddit URL.
pub fn subreddit(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            let segments: Vec<String> = u.path_segments()?.map(str::to_string).collect();
            segments
                .windows(2)
                .find(|w| w[0] == "r" && !w[1].is_empty())
                .map(|w| w[1].clone())
        })
        .map(|sub| format!("r/{}", sub))
        .unwrap_or_else(|| "r/environment".to_string())
}

fn snippet(raw: &str) -> Option<String> {
    let text = truncate_chars(&strip_markdown(raw), SNIPPET_CHARS)
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

fn x_mention(record: &SearchRecord) -> Option<Mention> {
    let text = snippet(record.text.as_deref().unwrap_or_default())?;
    Some(Mention {
        platform: X_PLATFORM_LABEL.to_string(),
        handle: x_handle(&record.url),
        text,
        url: record.url.clone(),
    })
}

fn reddit_mention(record: &SearchRecord) -> Option<Mention> {
    let raw = record
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(record.title.as_str());
    let text = snippet(raw)?;
    Some(Mention {
        platform: REDDIT_PLATFORM_LABEL.to_string(),
        handle: subreddit(&record.url),
        text,
        url: record.url.clone(),
    })
}

/// Alternate items from `a` and `b`, starting with `a`.
pub fn interleave<T>(a: Vec<T>, b: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (None, None) => break,
            (x, y) => {
                out.extend(x);
                out.extend(y);
            }
        }
    }
    out
}

pub struct MentionsFeed {
    provider: Arc<dyn SearchProvider>,
    queries: Vec<String>,
}

impl MentionsFeed {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self::with_queries(provider, Vec::new())
    }

    /// An empty pool falls back to [`DEFAULT_FEED_QUERIES`].
    pub fn with_queries(provider: Arc<dyn SearchProvider>, queries: Vec<String>) -> Self {
        let queries = if queries.is_empty() {
            DEFAULT_FEED_QUERIES.iter().map(|q| q.to_string()).collect()
        } else {
            queries
        };
        Self { provider, queries }
    }

    fn pick_query(&self) -> String {
        self.queries
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default()
    }

    fn plan(&self, channel: &str, domains: &[&str]) -> ChannelPlan {
        let mut request = SearchRequest::new(self.pick_query())
            .with("numResults", RESULTS_PER_SOURCE)
            .with("includeDomains", domains.to_vec())
            .with("text", true);
        SearchMode::Auto.apply(&mut request);
        ChannelPlan::Dispatch {
            channel: channel.to_string(),
            request,
        }
    }

    /// Latest mentions, X and Reddit interleaved. Any failure gives an empty feed.
    pub async fn fetch(&self) -> Vec<Mention> {
        let plans = vec![
            self.plan("x", &["x.com", "twitter.com"]),
            self.plan("reddit", &["reddit.com"]),
        ];
        let mut outcomes = settle_all(self.provider.as_ref(), plans).await.into_iter();

        let (Some((_, x)), Some((_, reddit))) = (outcomes.next(), outcomes.next()) else {
            return Vec::new();
        };
        match (x, reddit) {
            (ChannelOutcome::Records(x), ChannelOutcome::Records(reddit)) => interleave(
                x.iter().filter_map(x_mention).collect(),
                reddit.iter().filter_map(reddit_mention).collect(),
            ),
            (x, reddit) => {
                for outcome in [x, reddit] {
                    if let ChannelOutcome::Failed(e) = outcome {
                        tracing::warn!(error = %e, "Mentions feed search failed");
                    }
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_common_markdown() {
        let text = "# Title\n\n**Bold** and *italic* with `code` and [a link](https://x.y)\n- item\n1. first\n> quote\n---";
        assert_eq!(
            strip_markdown(text),
            "Title Bold and italic with code and a link item first quote"
        );
    }

    #[test]
    fn handles_from_urls() {
        assert_eq!(x_handle("https://x.com/greenpeace/status/1"), "@greenpeace");
        assert_eq!(x_handle("https://x.com/"), "@unknown");
        assert_eq!(x_handle("nope"), "@unknown");
        assert_eq!(subreddit("https://www.reddit.com/r/climate/comments/abc"), "r/climate");
        assert_eq!(subreddit("https://www.reddit.com/user/someone"), "r/environment");
    }

    #[test]
    fn interleaves_uneven_lists() {
        assert_eq!(interleave(vec![1, 3, 5, 7], vec![2, 4]), vec![1, 2, 3, 4, 5, 7]);
        assert_eq!(interleave(Vec::<i32>::new(), vec![1]), vec![1]);
    }

    #[test]
    fn reddit_falls_back_to_title() {
        let record = SearchRecord::new("Saving **bees**", "https://reddit.com/r/bees/1");
        let mention = reddit_mention(&record).unwrap();
        assert_eq!(mention.text, "Saving bees");
        assert_eq!(mention.handle, "r/bees");

        let empty = SearchRecord::new("", "https://x.com/a/status/1");
        assert!(x_mention(&empty).is_none());
    }

    #[test]
    fn snippet_is_bounded() {
        let record = SearchRecord::new("t", "https://x.com/a").with_text("word ".repeat(100));
        let mention = x_mention(&record).unwrap();
        assert!(mention.text.chars().count() <= SNIPPET_CHARS);
    }
}
