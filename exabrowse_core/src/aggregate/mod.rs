//! Multi-channel search aggregation.
//!
//! A query is fanned out to every requested channel of a [`ChannelTable`],
//! all provider calls run concurrently, and the outcomes are partitioned into
//! per-channel results and per-channel errors.

mod channels;
mod engine;
mod types;

pub use channels::{
    ChannelConfig, ChannelStore, ChannelStoreError, ChannelTable, DEFAULT_NUM_RESULTS,
    PLATFORMS_TABLE, SEARCH_TABLE,
};
pub use engine::{settle_all, Aggregator, ChannelPlan};
pub use types::{AggregateQuery, AggregateResponse, ChannelOutcome, SearchMode};
