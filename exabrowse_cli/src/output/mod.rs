use crate::cli::{Cli, OutputFormat};
use crate::commands::Result;
use exabrowse_core::summary::MentionSummary;
use exabrowse_core::{
    AggregateResponse, ChannelTable, DonationIntent, Entity, Mention, Occurrence,
    SpeciesCandidate, SpeciesStatus,
};
use serde::Serialize;
use serde_json::Value;

mod pretty;
pub use pretty::{format_channel_table, format_channel_tables};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    SearchResults {
        query: String,
        table: String,
        response: AggregateResponse,
    },
    EntityInfo(Entity),
    PlatformResults {
        entity: String,
        kind: String,
        response: AggregateResponse,
    },
    Summary {
        entity: String,
        days: u32,
        summary: MentionSummary,
    },
    Mentions(Vec<Mention>),
    ChatReply(String),
    Donation(DonationIntent),
    ChannelTables(Vec<ChannelTable>),
    ConfigInfo(Value),
    SpeciesCandidates {
        query: String,
        candidates: Vec<SpeciesCandidate>,
    },
    SpeciesStatus {
        name: String,
        status: SpeciesStatus,
    },
    Occurrences {
        name: String,
        occurrences: Vec<Occurrence>,
    },
}

/// Print `data` in the format the user asked for. `--no-color` turns
/// pretty output into plain text.
pub fn emit(cli: &Cli, data: &OutputData) -> Result<()> {
    let format = match cli.output {
        OutputFormat::Pretty if cli.no_color => OutputFormat::Text,
        other => other,
    };
    format_output(data, &format)
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => {
            print!("{}", format_text(data)?);
        }
        OutputFormat::Pretty => {
            print!("{}", pretty::format_pretty(data));
        }
    }
    Ok(())
}

fn format_text(data: &OutputData) -> Result<String> {
    let mut out = String::new();
    match data {
        OutputData::SearchResults { response, .. }
        | OutputData::PlatformResults { response, .. } => {
            for (channel, records) in &response.results {
                out.push_str(&format!("[{}]\n", channel));
                for record in records {
                    out.push_str(&format!("{}\t{}\n", record.title, record.url));
                }
            }
            if let Some(errors) = &response.errors {
                for (channel, message) in errors {
                    out.push_str(&format!("[{}] error: {}\n", channel, message));
                }
            }
        }
        OutputData::EntityInfo(entity) => {
            out.push_str(&format!("{}\n", entity.name));
            if !entity.description.is_empty() {
                out.push_str(&format!("{}\n", entity.description));
            }
            if let Some(website) = &entity.website {
                out.push_str(&format!("website\t{}\n", website));
            }
            for profile in &entity.social_profiles {
                out.push_str(&format!("{}\t{}\n", profile.platform, profile.url));
            }
        }
        OutputData::Summary { summary, .. } => {
            out.push_str(&serde_json::to_string_pretty(summary)?);
            out.push('\n');
        }
        OutputData::Mentions(mentions) => {
            for mention in mentions {
                out.push_str(&format!(
                    "{} {}\t{}\t{}\n",
                    mention.platform, mention.handle, mention.text, mention.url
                ));
            }
        }
        OutputData::ChatReply(reply) => {
            out.push_str(reply);
            out.push('\n');
        }
        OutputData::Donation(intent) => {
            out.push_str(&format!("{}\n", intent.client_secret));
        }
        OutputData::ChannelTables(tables) => {
            for table in tables {
                out.push_str(&format!(
                    "{}: {}\n",
                    table.name,
                    table.channel_ids().join(", ")
                ));
            }
        }
        OutputData::ConfigInfo(value) => {
            out.push_str(&serde_json::to_string_pretty(value)?);
            out.push('\n');
        }
        OutputData::SpeciesCandidates { candidates, .. } => {
            for c in candidates {
                out.push_str(&format!("{}\t{}\t{}\n", c.id, c.scientific_name, c.label));
            }
        }
        OutputData::SpeciesStatus { name, status } => match &status.assessment {
            Some(a) if status.found => {
                out.push_str(&format!(
                    "{}\t{}\t{}\n",
                    a.red_list_category, a.red_list_category_name, a.population_trend_name
                ));
                if !a.native_countries.is_empty() {
                    out.push_str(&format!("countries\t{}\n", a.native_countries.join(",")));
                }
                for threat in &a.threats {
                    out.push_str(&format!("threat\t{}\n", threat));
                }
                out.push_str(&format!("{}\n", a.iucn_url));
            }
            _ => out.push_str(&format!("{}: not found\n", name)),
        },
        OutputData::Occurrences { occurrences, .. } => {
            for o in occurrences {
                out.push_str(&format!(
                    "{}\t{}\t{}\t{}\n",
                    o.lat,
                    o.lng,
                    o.year.map(|y| y.to_string()).unwrap_or_default(),
                    o.country.as_deref().unwrap_or_default()
                ));
            }
        }
    }
    Ok(out)
}
