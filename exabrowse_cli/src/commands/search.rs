use crate::cli::{Cli, ModeArg};
use crate::commands::{find_table, spinner, CommandError, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::{AggregateQuery, Aggregator};
use serde_json::{Map, Value};

pub async fn run(
    cli: &Cli,
    query: &str,
    channels: &[String],
    mode: ModeArg,
    options: Option<&str>,
    table_name: &str,
) -> Result<()> {
    let table = find_table(table_name)?;
    let ctx = Context::load()?;
    let aggregator = Aggregator::new(ctx.search_provider()?, table);

    let mut request = AggregateQuery::new(query)
        .with_mode(mode.into())
        .with_channels(channels.iter().map(|c| c.trim().to_string()));
    if let Some(raw) = options {
        request = request.with_options(parse_options(raw)?);
    }

    let targets = aggregator.table().resolve_channels(&request.channels);
    let progress = spinner(format!(
        "Searching {} for '{}'...",
        targets.join(", "),
        query
    ));
    let result = aggregator.aggregate(&request).await;
    progress.finish_and_clear();
    let response = result?;

    if response.all_failed() {
        tracing::warn!("Every channel failed");
    }

    emit(
        cli,
        &OutputData::SearchResults {
            query: request.query.clone(),
            table: table_name.to_string(),
            response,
        },
    )
}

/// `--options` must be a JSON object; it is merged into every request.
fn parse_options(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(CommandError::InvalidInput(
            "--options must be a JSON object".to_string(),
        )),
    }
}
