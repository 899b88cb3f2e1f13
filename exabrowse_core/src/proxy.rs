//! Fetch an HTML page and make it embeddable in a frame.

use crate::config::HttpSettings;
use crate::error::{BrowseError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Sent upstream in place of the configured agent; many sites refuse
/// non-browser clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

static HEAD_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)<head>").ok());

/// A rewritten page plus the headers it should be served with.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxiedPage {
    pub html: String,
    pub headers: Vec<(&'static str, &'static str)>,
}

impl ProxiedPage {
    fn new(html: String) -> Self {
        Self {
            html,
            headers: vec![
                ("Content-Type", "text/html; charset=utf-8"),
                ("X-Frame-Options", "ALLOWALL"),
                ("Content-Security-Policy", ""),
            ],
        }
    }
}

/// Validate a proxy target and return it with its `scheme://host[:port]` base.
pub fn parse_target(raw: Option<&str>) -> Result<(Url, String)> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BrowseError::InvalidInput("URL parameter is required".into()))?;
    let url = Url::parse(raw).map_err(|e| BrowseError::InvalidInput(format!("Invalid URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BrowseError::InvalidInput(
            "Only http and https URLs can be proxied".into(),
        ));
    }
    let base = url.origin().ascii_serialization();
    Ok((url, base))
}

/// Insert `<base href>` right after the first `<head>`, matched case-insensitively.
/// Pages without one are returned unchanged.
pub fn inject_base_tag(html: &str, base_href: &str) -> String {
    let Some(re) = HEAD_TAG.as_ref() else {
        return html.to_string();
    };
    let Some(head) = re.find(html) else {
        return html.to_string();
    };
    let tag = format!(
        "<base href=\"{}\">",
        html_escape::encode_double_quoted_attribute(base_href)
    );
    let mut out = String::with_capacity(html.len() + tag.len());
    out.push_str(&html[..head.end()]);
    out.push_str(&tag);
    out.push_str(&html[head.end()..]);
    out
}

pub struct PageProxy {
    client: Client,
}

impl PageProxy {
    pub fn new(http: &HttpSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()
            .map_err(|e| BrowseError::Internal(e.to_string()))?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, raw_url: Option<&str>) -> Result<ProxiedPage> {
        let (url, base) = parse_target(raw_url)?;
        tracing::debug!(url = %url, "Proxying page");

        let resp = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(BrowseError::HttpRequest)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BrowseError::Upstream {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let is_html = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"));
        if !is_html {
            return Err(BrowseError::InvalidInput(
                "Only HTML content can be proxied".into(),
            ));
        }

        let html = resp.text().await.map_err(BrowseError::HttpRequest)?;
        Ok(ProxiedPage::new(inject_base_tag(&html, &base)))
    }
}
