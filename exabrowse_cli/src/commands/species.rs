use crate::cli::{Cli, SpeciesAction};
use crate::commands::{spinner, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::{OccurrenceLookup, RedListLookup, SpeciesSearch, SpeciesStatus};

pub async fn run(cli: &Cli, action: SpeciesAction) -> Result<()> {
    let ctx = Context::load()?;
    match action {
        SpeciesAction::Search { query } => {
            let search = SpeciesSearch::new(ctx.taxonomy_provider()?);
            let progress = spinner(format!("Searching taxa for '{}'...", query));
            let candidates = search.search(&query).await;
            progress.finish_and_clear();
            emit(cli, &OutputData::SpeciesCandidates { query, candidates })
        }
        SpeciesAction::Status { name } => {
            // Missing credentials read as "not found", same as a failed lookup
            let status = match ctx.red_list_provider() {
                Ok(provider) => {
                    let progress = spinner(format!("Looking up Red List status of {}...", name));
                    let status = RedListLookup::new(provider).lookup(&name).await;
                    progress.finish_and_clear();
                    status
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Red List provider unavailable");
                    SpeciesStatus::not_found()
                }
            };
            emit(cli, &OutputData::SpeciesStatus { name, status })
        }
        SpeciesAction::Occurrences { name, limit } => {
            let lookup = OccurrenceLookup::new(ctx.occurrence_provider()?);
            let progress = spinner(format!("Fetching occurrences of {}...", name));
            let occurrences = lookup.lookup(&name, limit).await;
            progress.finish_and_clear();
            emit(cli, &OutputData::Occurrences { name, occurrences })
        }
    }
}
