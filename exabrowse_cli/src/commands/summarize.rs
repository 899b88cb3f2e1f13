use crate::cli::Cli;
use crate::commands::entity::recents_query;
use crate::commands::{spinner, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::{
    MentionSummarizer, PlatformRecents, PromptTemplate, SearchRecord, SummaryInput,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Summarise saved results, or resolve the entity and fetch its recent
/// posts first when no input file is given.
pub async fn run(cli: &Cli, name: &str, input: Option<&Path>, days: u32) -> Result<()> {
    let ctx = Context::load()?;

    let (entity_name, results) = match input {
        Some(path) => (name.to_string(), read_results(path)?),
        None => {
            let provider = ctx.search_provider()?;
            let query = recents_query(provider.clone(), name, &[], days).await?;
            let progress = spinner(format!("Fetching recent posts by {}...", query.entity_name));
            let fetched = PlatformRecents::new(provider).fetch(&query).await;
            progress.finish_and_clear();
            (query.entity_name.clone(), fetched?.results)
        }
    };

    let summary_input = SummaryInput {
        results,
        entity_name: entity_name.clone(),
        days,
    };
    let summarizer = MentionSummarizer::with_template(
        ctx.summary_provider()?,
        PromptTemplate::from_settings(&ctx.config.summary),
    );

    let progress = spinner(format!("Summarising mentions of {}...", entity_name));
    let result = summarizer.summarize(&summary_input).await;
    progress.finish_and_clear();

    emit(
        cli,
        &OutputData::Summary {
            entity: entity_name,
            days,
            summary: result?,
        },
    )
}

/// Accepts either a bare `{channel: [records]}` map or a saved search
/// response carrying it under `results`.
fn read_results(path: &Path) -> Result<BTreeMap<String, Vec<SearchRecord>>> {
    let content = std::fs::read_to_string(path)?;
    let mut value: serde_json::Value = serde_json::from_str(&content)?;
    if let Some(results) = value.get_mut("results") {
        value = results.take();
    }
    Ok(serde_json::from_value(value)?)
}
