use crate::cli::Cli;
use crate::commands::{spinner, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::MentionsFeed;

/// Missing search credentials give an empty feed, same as a failed search.
pub async fn run(cli: &Cli) -> Result<()> {
    let ctx = Context::load()?;
    let mentions = match ctx.search_provider() {
        Ok(provider) => {
            let feed = MentionsFeed::with_queries(provider, ctx.config.mentions.queries.clone());
            let progress = spinner("Fetching community mentions...");
            let mentions = feed.fetch().await;
            progress.finish_and_clear();
            mentions
        }
        Err(e) => {
            tracing::warn!(error = %e, "Search provider unavailable for mentions feed");
            Vec::new()
        }
    };
    emit(cli, &OutputData::Mentions(mentions))
}
