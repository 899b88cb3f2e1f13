use crate::providers::SearchRecord;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Reverse;

/// First `max` characters of `s`, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Parse a provider timestamp: RFC 3339 first, then a bare `YYYY-MM-DD`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Stable sort, newest first. Missing or unparseable dates sort last.
pub fn sort_newest_first(records: &mut [SearchRecord]) {
    records.sort_by_key(|r| Reverse(r.published_date.as_deref().and_then(parse_timestamp)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn parses_both_timestamp_shapes() {
        assert!(parse_timestamp("2024-06-01T12:30:00.000Z").is_some());
        assert!(parse_timestamp("2024-06-01").is_some());
        assert!(parse_timestamp("June 1st").is_none());
    }

    #[test]
    fn newest_first_puts_undated_last() {
        let mut records = vec![
            SearchRecord::new("none", "u1"),
            SearchRecord::new("jan", "u2").with_published_date("2024-01-01"),
            SearchRecord::new("jun", "u3").with_published_date("2024-06-01T00:00:00Z"),
            SearchRecord::new("bad", "u4").with_published_date("soon"),
        ];
        sort_newest_first(&mut records);
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["jun", "jan", "none", "bad"]);
    }
}
