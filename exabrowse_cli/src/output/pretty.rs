//! Pretty formatter for terminal output.
//!
//! Results render as numbered cards grouped under channel headers; channel
//! tables render with comfy-table.

use super::OutputData;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use exabrowse_core::summary::MentionSummary;
use exabrowse_core::{
    AggregateResponse, ChannelTable, Entity, Mention, Occurrence, SearchRecord, SpeciesCandidate,
    SpeciesStatus,
};
use owo_colors::OwoColorize;
use serde_json::Value;

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Indent for card content (after number)
const CARD_INDENT: usize = 6;

const SNIPPET_CHARS: usize = 240;

/// Occurrence rows printed before the rest are summarised.
const OCCURRENCE_ROWS: usize = 20;

pub fn format_pretty(data: &OutputData) -> String {
    let width = terminal_width();
    match data {
        OutputData::SearchResults {
            query,
            table,
            response,
        } => {
            let mut out = format!("{} {}\n", "Search:".bold().cyan(), query.yellow());
            out.push_str(&format!(
                "{} {}  {} {}\n\n",
                "Table:".dimmed(),
                table.green(),
                "Mode:".dimmed(),
                response.mode.green()
            ));
            out.push_str(&format_response(response, width));
            out
        }
        OutputData::PlatformResults {
            entity,
            kind,
            response,
        } => {
            let mut out = format!("{} {}\n\n", format!("{}:", kind).bold().cyan(), entity.yellow());
            out.push_str(&format_response(response, width));
            out
        }
        OutputData::EntityInfo(entity) => format_entity(entity, width),
        OutputData::Summary {
            entity,
            days,
            summary,
        } => format_summary(entity, *days, summary, width),
        OutputData::Mentions(mentions) => format_mentions(mentions, width),
        OutputData::ChatReply(reply) => format!("{}\n", wrap(reply, width, "")),
        OutputData::Donation(intent) => format!(
            "{}\n  {} {}\n",
            "Payment intent created".green().bold(),
            "client secret:".dimmed(),
            intent.client_secret
        ),
        OutputData::ChannelTables(tables) => format_channel_tables(tables),
        OutputData::ConfigInfo(value) => format_config(value),
        OutputData::SpeciesCandidates { query, candidates } => {
            format_species_candidates(query, candidates)
        }
        OutputData::SpeciesStatus { name, status } => format_species_status(name, status, width),
        OutputData::Occurrences { name, occurrences } => format_occurrences(name, occurrences),
    }
}

fn format_response(response: &AggregateResponse, width: usize) -> String {
    let mut out = String::new();
    for (channel, records) in &response.results {
        out.push_str(&format_section_header(channel, Some(records.len()), width));
        out.push('\n');
        for (i, record) in records.iter().enumerate() {
            out.push_str(&format_card(record, i + 1, width));
        }
        out.push('\n');
    }

    if let Some(errors) = &response.errors {
        out.push_str(&format!("{}\n", "Failed channels".red().bold()));
        for (channel, message) in errors {
            out.push_str(&format!(
                "  {} {}: {}\n",
                "✗".red(),
                channel.bold(),
                truncate_str(message, width.saturating_sub(channel.len() + 6)).dimmed()
            ));
        }
        out.push('\n');
    }

    if response.results.is_empty() && response.errors.is_none() {
        out.push_str(&format!("{}\n", "No results.".yellow()));
    } else {
        out.push_str(&format!(
            "{}\n",
            format!("{} results", response.total_count()).dimmed()
        ));
    }
    out
}

fn format_card(record: &SearchRecord, index: usize, width: usize) -> String {
    let mut output = String::new();
    let index_str = format!(" {:>3}. ", index).cyan().bold().to_string();

    let title = if record.title.trim().is_empty() {
        "(no title)"
    } else {
        record.title.as_str()
    };
    output.push_str(&format!("{}{}\n", index_str, title.bold()));
    output.push_str(&format!(
        "      {}\n",
        format_hyperlink(&record.url, &record.url).blue()
    ));

    if let Some(text) = &record.text {
        let clean = clean_snippet(text);
        if !clean.is_empty() {
            let content_width = width.saturating_sub(CARD_INDENT + 2);
            let snippet = truncate_str(&clean, SNIPPET_CHARS);
            output.push_str(&format!(
                "{}\n",
                wrap(&snippet, content_width, "      ").dimmed()
            ));
        }
    }

    let mut meta = Vec::new();
    if let Some(date) = &record.published_date {
        meta.push(date.clone());
    }
    if let Some(author) = &record.author {
        meta.push(author.clone());
    }
    if !meta.is_empty() {
        output.push_str(&format!("      {}\n", meta.join(" · ").dimmed()));
    }
    output
}

fn format_entity(entity: &Entity, width: usize) -> String {
    let mut out = format!("{}\n", entity.name.bold().cyan());
    if !entity.description.is_empty() {
        out.push_str(&format!("{}\n", wrap(&entity.description, width, "")));
    }
    out.push('\n');
    if let Some(website) = &entity.website {
        out.push_str(&format!(
            "  {:<12} {}\n",
            "Website".dimmed(),
            format_hyperlink(website, website).blue()
        ));
    }
    for profile in &entity.social_profiles {
        let handle = profile
            .username
            .as_deref()
            .map(|u| format!(" ({})", u))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<12} {}{}\n",
            profile.platform.display_name().dimmed(),
            format_hyperlink(&profile.url, &profile.url).blue(),
            handle.green()
        ));
    }
    if entity.website.is_none() && entity.social_profiles.is_empty() {
        out.push_str(&format!("{}\n", "No website or profiles found.".yellow()));
    }
    out
}

fn format_summary(entity: &str, days: u32, summary: &MentionSummary, width: usize) -> String {
    let mut out = format!(
        "{} {} {}\n\n",
        "Mentions of".bold().cyan(),
        entity.yellow().bold(),
        format!("(last {} days)", days).dimmed()
    );

    out.push_str(&format_section_header("Hottest topics", None, width));
    out.push('\n');
    for topic in &summary.hottest_topics {
        out.push_str(&format!(
            "  {} {} {}\n",
            "•".cyan(),
            topic.theme.bold(),
            format!("×{} · {}", topic.count, topic.period).dimmed()
        ));
    }

    out.push('\n');
    out.push_str(&format_section_header("Key quotes", None, width));
    out.push('\n');
    for quote in &summary.key_quotes {
        out.push_str(&format!(
            "{}\n",
            wrap(&format!("“{}”", quote), width.saturating_sub(4), "  ").italic()
        ));
    }

    out.push('\n');
    out.push_str(&format_section_header("Timeline", None, width));
    out.push('\n');
    for period in &summary.theme_timeline {
        out.push_str(&format!(
            "  {:<16} {}\n",
            period.period.green(),
            period.themes.join(", ")
        ));
    }
    out
}

fn format_mentions(mentions: &[Mention], width: usize) -> String {
    if mentions.is_empty() {
        return format!("{}\n", "No mentions right now.".yellow());
    }
    let mut out = String::new();
    for mention in mentions {
        out.push_str(&format!(
            "{} {}\n",
            mention.platform.cyan().bold(),
            mention.handle.green()
        ));
        out.push_str(&format!(
            "{}\n",
            wrap(&mention.text, width.saturating_sub(CARD_INDENT), "  ")
        ));
        out.push_str(&format!(
            "  {}\n\n",
            format_hyperlink(&mention.url, &mention.url).blue()
        ));
    }
    out
}

/// Summary table of every channel table.
pub fn format_channel_tables(tables: &[ChannelTable]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Table"),
            Cell::new("Default"),
            Cell::new("Channels"),
            Cell::new("Description"),
        ]);
    for t in tables {
        table.add_row(vec![
            Cell::new(&t.name),
            Cell::new(&t.default_channel),
            Cell::new(t.channel_ids().join(", ")),
            Cell::new(t.description.as_deref().unwrap_or("")),
        ]);
    }
    format!("{}\n", table)
}

/// One table's channels with the parameters each sends.
pub fn format_channel_table(t: &ChannelTable) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Channel"),
            Cell::new("Domains"),
            Cell::new("Category"),
            Cell::new("Results"),
            Cell::new("Text"),
        ]);
    for (id, config) in &t.channels {
        let id = if *id == t.default_channel {
            format!("{} *", id)
        } else {
            id.clone()
        };
        table.add_row(vec![
            Cell::new(id),
            Cell::new(config.include_domains.join(", ")),
            Cell::new(config.category.as_deref().unwrap_or("")),
            Cell::new(config.num_results),
            Cell::new(if config.full_text { "yes" } else { "no" }),
        ]);
    }
    format!("{}\n{}\n", t.name.bold().cyan(), table)
}

fn format_species_candidates(query: &str, candidates: &[SpeciesCandidate]) -> String {
    if candidates.is_empty() {
        return format!("{} '{}'.\n", "No species found for".yellow(), query);
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Id"),
            Cell::new("Name"),
            Cell::new("Scientific name"),
            Cell::new("Description"),
        ]);
    for c in candidates {
        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(&c.label),
            Cell::new(&c.scientific_name),
            Cell::new(&c.description),
        ]);
    }
    format!("{} {}\n{}\n", "Species:".bold().cyan(), query.yellow(), table)
}

fn format_species_status(name: &str, status: &SpeciesStatus, width: usize) -> String {
    let (Some(taxon), Some(a)) = (&status.taxon, &status.assessment) else {
        return format!("{} {}\n", "No Red List assessment for".yellow(), name);
    };

    let mut out = format!("{}", taxon.scientific_name.bold().cyan().italic());
    if let Some(common) = &taxon.common_name {
        out.push_str(&format!(" {}", format!("({})", common).dimmed()));
    }
    out.push_str("\n\n");

    let category = format!("{} {}", a.red_list_category, a.red_list_category_name);
    let category = match a.red_list_category.as_str() {
        "CR" | "EN" | "EW" | "EX" => category.red().bold().to_string(),
        "VU" | "NT" => category.yellow().bold().to_string(),
        _ => category.green().bold().to_string(),
    };
    out.push_str(&format!("  {:<12} {}\n", "Status".dimmed(), category));
    out.push_str(&format!(
        "  {:<12} {}\n",
        "Trend".dimmed(),
        a.population_trend_name
    ));
    if let Some(year) = a.year {
        out.push_str(&format!("  {:<12} {}\n", "Assessed".dimmed(), year));
    }
    if !a.native_countries.is_empty() {
        out.push_str(&format!(
            "  {:<12} {}\n",
            "Native to".dimmed(),
            a.native_countries.join(", ")
        ));
    }
    if let Some(population) = &a.population_size {
        out.push('\n');
        out.push_str(&format_section_header("Population", None, width));
        out.push('\n');
        out.push_str(&format!("{}\n", wrap(population, width.saturating_sub(4), "  ")));
    }
    if !a.threats.is_empty() {
        out.push('\n');
        out.push_str(&format_section_header("Threats", None, width));
        out.push('\n');
        for threat in &a.threats {
            out.push_str(&format!("  {} {}\n", "•".cyan(), threat));
        }
    }
    out.push_str(&format!(
        "\n  {}\n",
        format_hyperlink(&a.iucn_url, &a.iucn_url).blue()
    ));
    out
}

fn format_occurrences(name: &str, occurrences: &[Occurrence]) -> String {
    if occurrences.is_empty() {
        return format!("{} {}\n", "No occurrences found for".yellow(), name);
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Lat"),
            Cell::new("Lng"),
            Cell::new("Year"),
            Cell::new("Country"),
        ]);
    for o in occurrences.iter().take(OCCURRENCE_ROWS) {
        table.add_row(vec![
            Cell::new(format!("{:.4}", o.lat)),
            Cell::new(format!("{:.4}", o.lng)),
            Cell::new(o.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(o.country.as_deref().unwrap_or("")),
        ]);
    }
    let mut out = format!(
        "{} {} {}\n{}\n",
        "Occurrences of".bold().cyan(),
        name.yellow().italic(),
        format!("({})", occurrences.len()).dimmed(),
        table
    );
    if occurrences.len() > OCCURRENCE_ROWS {
        out.push_str(&format!(
            "{}\n",
            format!(
                "... and {} more (use --output json for all)",
                occurrences.len() - OCCURRENCE_ROWS
            )
            .dimmed()
        ));
    }
    out
}

fn format_config(value: &Value) -> String {
    let mut out = format!("{}\n", "Configuration".bold().cyan());
    if let Some(dir) = value.get("config_dir").and_then(|d| d.as_str()) {
        out.push_str(&format!("{} {}\n", "Directory:".dimmed(), dir));
    }
    out.push('\n');
    if let Some(providers) = value.get("providers").and_then(|p| p.as_object()) {
        for (name, status) in providers {
            let source = status.get("source").and_then(|s| s.as_str()).unwrap_or("");
            let mark = if source == "missing" {
                "✗".red().to_string()
            } else {
                "✓".green().to_string()
            };
            let key = status.get("key").and_then(|k| k.as_str()).unwrap_or("");
            out.push_str(&format!(
                "  {} {:<10} {} {}\n",
                mark,
                name.bold(),
                key,
                format!("({})", source).dimmed()
            ));
        }
    }
    if let Some(llm) = value.get("llm") {
        out.push_str(&format!(
            "\n{} {}\n",
            "LLM:".dimmed(),
            serde_json::to_string(llm).unwrap_or_default()
        ));
    }
    out
}

fn format_section_header(label: &str, count: Option<usize>, width: usize) -> String {
    let count_str = match count {
        Some(n) => format!(" ({} results)", n),
        None => String::new(),
    };

    let header_text = format!("{}{}", label, count_str);
    let line_len = (width.saturating_sub(header_text.chars().count() + 4)).min(60);
    let line = "─".repeat(line_len);

    format!(
        "{} {} {}",
        "──".cyan(),
        header_text.green().bold(),
        line.cyan()
    )
}

fn wrap(text: &str, width: usize, indent: &str) -> String {
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

fn truncate_str(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or(s);

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn clean_snippet(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Format a URL as a clickable OSC 8 hyperlink.
fn format_hyperlink(url: &str, display_text: &str) -> String {
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, display_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exabrowse_core::{ChannelConfig, SearchMode, SocialProfile};

    #[test]
    fn test_format_card() {
        let record = SearchRecord::new("Test Article", "https://example.com")
            .with_text("This is a   test\ndescription")
            .with_published_date("2024-05-01");
        let output = format_card(&record, 1, 80);
        assert!(output.contains("Test Article"));
        assert!(output.contains("example.com"));
        assert!(output.contains("This is a test description"));
        assert!(output.contains("2024-05-01"));
    }

    #[test]
    fn test_occurrences_beyond_limit_are_summarised() {
        let occurrences: Vec<Occurrence> = (0..25)
            .map(|i| Occurrence {
                lat: i as f64,
                lng: 10.0,
                year: Some(2020),
                country: None,
            })
            .collect();
        let output = format_occurrences("Panthera leo", &occurrences);
        assert!(output.contains("(25)"));
        assert!(output.contains("and 5 more"));
    }

    #[test]
    fn test_species_status_not_found() {
        let output = format_species_status("Nessie", &SpeciesStatus::not_found(), 80);
        assert!(output.contains("No Red List assessment"));
        assert!(output.contains("Nessie"));
    }

    #[test]
    fn test_truncate_str() {
        let long = "This is a very long string that should be truncated";
        let truncated = truncate_str(long, 20);
        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().count() <= 20);
    }

    #[test]
    fn test_format_section_header() {
        let header = format_section_header("video", Some(6), 80);
        assert!(header.contains("video"));
        assert!(header.contains("6"));
    }

    #[test]
    fn test_response_lists_failed_channels() {
        let mut response = AggregateResponse::new(SearchMode::Auto);
        response
            .errors
            .get_or_insert_with(Default::default)
            .insert("news".into(), "HTTP 500".into());
        let output = format_response(&response, 80);
        assert!(output.contains("Failed channels"));
        assert!(output.contains("news"));
        assert!(output.contains("HTTP 500"));
    }

    #[test]
    fn test_entity_lists_profiles() {
        let entity = Entity {
            name: "NASA".into(),
            description: "Space agency.".into(),
            website: Some("https://www.nasa.gov".into()),
            social_profiles: vec![SocialProfile::from_url("https://x.com/NASA")],
        };
        let output = format_entity(&entity, 80);
        assert!(output.contains("NASA"));
        assert!(output.contains("https://www.nasa.gov"));
        assert!(output.contains("Twitter/X"));
    }

    #[test]
    fn test_channel_table_marks_default() {
        let table = ChannelTable::new("rust", "docs")
            .with_channel("docs", ChannelConfig::new(3).domains(&["docs.rs"]))
            .with_channel("blogs", ChannelConfig::new(5).with_text());
        let output = format_channel_table(&table);
        assert!(output.contains("docs *"));
        assert!(output.contains("docs.rs"));
    }
}
