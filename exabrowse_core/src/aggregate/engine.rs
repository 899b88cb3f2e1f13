//! Multi-channel search execution.
//!
//! Every channel becomes one provider call. All calls are polled together and
//! the join waits for every one of them; a slow or failing channel never
//! cancels its siblings.

use super::channels::ChannelTable;
use super::types::{AggregateQuery, AggregateResponse, ChannelOutcome};
use crate::error::{BrowseError, Result};
use crate::providers::{SearchProvider, SearchRequest};
use std::sync::Arc;
use std::time::Instant;

/// One unit of work for [`settle_all`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelPlan {
    /// Issue `request` against the provider.
    Dispatch {
        channel: String,
        request: SearchRequest,
    },
    /// Resolved without a provider call.
    Rejected { channel: String, message: String },
}

impl ChannelPlan {
    pub fn channel(&self) -> &str {
        match self {
            ChannelPlan::Dispatch { channel, .. } | ChannelPlan::Rejected { channel, .. } => {
                channel
            }
        }
    }
}

/// Run every plan concurrently and collect one outcome per plan, in plan order.
pub async fn settle_all(
    provider: &dyn SearchProvider,
    plans: Vec<ChannelPlan>,
) -> Vec<(String, ChannelOutcome)> {
    let futures: Vec<_> = plans
        .into_iter()
        .map(|plan| async move {
            match plan {
                ChannelPlan::Rejected { channel, message } => {
                    (channel, ChannelOutcome::Failed(message))
                }
                ChannelPlan::Dispatch { channel, request } => {
                    let start = Instant::now();
                    tracing::debug!(channel = %channel, provider = provider.name(), "Dispatching channel");
                    let outcome = match provider.search(&request).await {
                        Ok(records) => ChannelOutcome::Records(records),
                        Err(e) => ChannelOutcome::Failed(e.to_string()),
                    };
                    let elapsed_ms = start.elapsed().as_millis() as u64;
                    match &outcome {
                        ChannelOutcome::Records(r) => {
                            tracing::debug!(channel = %channel, count = r.len(), elapsed_ms, "Channel completed")
                        }
                        ChannelOutcome::Failed(e) => {
                            tracing::debug!(channel = %channel, error = %e, elapsed_ms, "Channel failed")
                        }
                    }
                    (channel, outcome)
                }
            }
        })
        .collect();

    futures::future::join_all(futures).await
}

/// Fans a query out over the channels of one table.
pub struct Aggregator {
    provider: Arc<dyn SearchProvider>,
    table: ChannelTable,
}

impl Aggregator {
    pub fn new(provider: Arc<dyn SearchProvider>, table: ChannelTable) -> Self {
        Self { provider, table }
    }

    /// Aggregator over the built-in `search` table.
    pub fn with_search_table(provider: Arc<dyn SearchProvider>) -> Self {
        Self::new(provider, ChannelTable::search())
    }

    pub fn table(&self) -> &ChannelTable {
        &self.table
    }

    pub fn provider(&self) -> &Arc<dyn SearchProvider> {
        &self.provider
    }

    /// Turn a query into one plan per requested channel.
    pub fn plan(&self, query: &AggregateQuery) -> Vec<ChannelPlan> {
        let text = query.query.trim();
        self.table
            .resolve_channels(&query.channels)
            .into_iter()
            .map(|channel| match self.table.get(&channel) {
                Some(config) => ChannelPlan::Dispatch {
                    request: config.request_for(text, query.mode, query.options.as_ref()),
                    channel,
                },
                None => ChannelPlan::Rejected {
                    message: format!("Unknown result type: {}", channel),
                    channel,
                },
            })
            .collect()
    }

    /// Run the query and partition channel outcomes into results and errors.
    ///
    /// Only an empty query fails the call; channel failures land in `errors`.
    pub async fn aggregate(&self, query: &AggregateQuery) -> Result<AggregateResponse> {
        if query.query.trim().is_empty() {
            return Err(BrowseError::InvalidInput("Provide a non-empty query.".into()));
        }

        let start = Instant::now();
        let plans = self.plan(query);
        let outcomes = settle_all(self.provider.as_ref(), plans).await;

        let mut response = AggregateResponse::new(query.mode);
        for (channel, outcome) in outcomes {
            response.add_outcome(channel, outcome);
        }

        tracing::debug!(
            table = %self.table.name,
            channels = response.results.len(),
            failed = response.errors.as_ref().map(|e| e.len()).unwrap_or(0),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Aggregate search finished"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SearchMode;

    struct Never;

    #[async_trait::async_trait]
    impl SearchProvider for Never {
        fn name(&self) -> &'static str {
            "never"
        }

        async fn search(
            &self,
            _request: &SearchRequest,
        ) -> Result<Vec<crate::providers::SearchRecord>> {
            unreachable!("planning must not call the provider")
        }
    }

    #[test]
    fn unknown_channel_is_rejected_without_request() {
        let aggregator = Aggregator::with_search_table(Arc::new(Never));
        let plans = aggregator.plan(
            &AggregateQuery::new(" bees ").with_channels(["video", "podcasts"]),
        );
        assert_eq!(plans.len(), 2);
        match &plans[0] {
            ChannelPlan::Dispatch { channel, request } => {
                assert_eq!(channel, "video");
                assert_eq!(request.query, "bees");
            }
            other => panic!("expected dispatch, got {:?}", other),
        }
        assert_eq!(
            plans[1],
            ChannelPlan::Rejected {
                channel: "podcasts".into(),
                message: "Unknown result type: podcasts".into()
            }
        );
    }

    #[test]
    fn no_channels_plans_default() {
        let aggregator = Aggregator::with_search_table(Arc::new(Never));
        let plans = aggregator.plan(&AggregateQuery::new("q").with_mode(SearchMode::Fast));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].channel(), "general");
    }
}
