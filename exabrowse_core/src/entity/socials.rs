use crate::aggregate::{AggregateQuery, AggregateResponse, Aggregator, ChannelTable, SearchMode};
use crate::error::{BrowseError, Result};
use crate::providers::SearchProvider;
use std::sync::Arc;

/// Everything said about an entity on each platform of a channel table.
pub struct PlatformSocials {
    aggregator: Aggregator,
}

impl PlatformSocials {
    /// Uses the built-in `platforms` table.
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self::with_table(provider, ChannelTable::platforms())
    }

    pub fn with_table(provider: Arc<dyn SearchProvider>, table: ChannelTable) -> Self {
        Self {
            aggregator: Aggregator::new(provider, table),
        }
    }

    pub async fn fetch(&self, entity_name: &str) -> Result<AggregateResponse> {
        let name = entity_name.trim();
        if name.is_empty() {
            return Err(BrowseError::InvalidInput("Entity name is required".into()));
        }
        let query = AggregateQuery::new(name)
            .with_mode(SearchMode::Auto)
            .with_channels(self.aggregator.table().channel_ids());
        self.aggregator.aggregate(&query).await
    }
}
