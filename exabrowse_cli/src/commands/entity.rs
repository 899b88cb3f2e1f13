use crate::cli::Cli;
use crate::commands::{spinner, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::{
    Entity, EntityResolver, PlatformRecents, PlatformSocials, RecentsQuery, SearchProvider,
    SocialProfile,
};
use std::sync::Arc;

pub async fn run_entity(cli: &Cli, query: &str) -> Result<()> {
    let provider = Context::load()?.search_provider()?;
    let entity = resolve(provider, query).await?;
    emit(cli, &OutputData::EntityInfo(entity))
}

pub async fn run_socials(cli: &Cli, name: &str) -> Result<()> {
    let provider = Context::load()?.search_provider()?;
    let progress = spinner(format!("Searching platforms for '{}'...", name));
    let result = PlatformSocials::new(provider).fetch(name).await;
    progress.finish_and_clear();

    emit(
        cli,
        &OutputData::PlatformResults {
            entity: name.to_string(),
            kind: "Socials".to_string(),
            response: result?,
        },
    )
}

pub async fn run_recents(cli: &Cli, name: &str, profiles: &[String], days: u32) -> Result<()> {
    let provider = Context::load()?.search_provider()?;
    let query = recents_query(provider.clone(), name, profiles, days).await?;

    let progress = spinner(format!("Fetching recent posts by {}...", query.entity_name));
    let result = PlatformRecents::new(provider).fetch(&query).await;
    progress.finish_and_clear();

    emit(
        cli,
        &OutputData::PlatformResults {
            entity: query.entity_name.clone(),
            kind: "Recent posts".to_string(),
            response: result?,
        },
    )
}

pub(crate) async fn resolve(provider: Arc<dyn SearchProvider>, query: &str) -> Result<Entity> {
    let progress = spinner(format!("Resolving '{}'...", query));
    let result = EntityResolver::new(provider).resolve(query).await;
    progress.finish_and_clear();
    Ok(result?)
}

/// Profiles given on the command line, or the resolved entity's own.
pub(crate) async fn recents_query(
    provider: Arc<dyn SearchProvider>,
    name: &str,
    profiles: &[String],
    days: u32,
) -> Result<RecentsQuery> {
    if !profiles.is_empty() {
        let profiles = profiles.iter().map(SocialProfile::from_url).collect();
        return Ok(RecentsQuery::new(name, profiles).with_days(days));
    }

    let entity = resolve(provider, name).await?;
    tracing::debug!(
        entity = %entity.name,
        profiles = entity.social_profiles.len(),
        "Resolved profiles for recents"
    );
    Ok(RecentsQuery::new(entity.name, entity.social_profiles).with_days(days))
}
