// src/lib.rs
pub mod aggregate;
pub mod chat;
pub mod config;
pub mod credentials;
pub mod donation;
pub mod entity;
pub mod error;
pub mod mentions;
pub mod providers;
pub mod proxy;
pub mod species;
pub mod summary;
pub mod utils;

pub use aggregate::{
    AggregateQuery, AggregateResponse, Aggregator, ChannelConfig, ChannelStore, ChannelTable,
    SearchMode,
};
pub use chat::{ChatInput, TopicChat};
pub use config::AppConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use donation::{DonationIntent, Donations};
pub use entity::{
    Entity, EntityResolver, Platform, PlatformRecents, PlatformSocials, RecentsQuery,
    SocialProfile,
};
pub use error::{BrowseError, Result};
pub use mentions::{Mention, MentionsFeed};
pub use providers::{
    ChatMessage, CompletionProvider, OccurrenceProvider, PaymentProvider, RedListProvider,
    SearchProvider, SearchRecord, SearchRequest, TaxonomyProvider,
};
pub use proxy::{PageProxy, ProxiedPage};
pub use species::{
    Occurrence, OccurrenceLookup, RedListLookup, SpeciesCandidate, SpeciesSearch, SpeciesStatus,
};
pub use summary::{MentionSummarizer, MentionSummary, PromptTemplate, SummaryInput};
