pub mod channels;
pub mod chat;
pub mod config;
pub mod donate;
pub mod entity;
pub mod mentions;
pub mod proxy;
pub mod search;
pub mod species;
pub mod summarize;

use exabrowse_core::config::AppConfig;
use exabrowse_core::credentials::StoreError;
use exabrowse_core::providers::chat_completions::ChatCompletionsClient;
use exabrowse_core::providers::exa::ExaClient;
use exabrowse_core::providers::gbif::GbifClient;
use exabrowse_core::providers::iucn::IucnClient;
use exabrowse_core::providers::stripe::StripeClient;
use exabrowse_core::providers::wikidata::WikidataClient;
use exabrowse_core::{
    ChannelStore, ChannelTable, CompletionProvider, FileCredentialStore, OccurrenceProvider,
    PaymentProvider, RedListProvider, SearchProvider, TaxonomyProvider,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Core(#[from] exabrowse_core::BrowseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel store error: {0}")]
    Channels(#[from] exabrowse_core::aggregate::ChannelStoreError),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Config, credentials and the provider clients commands are built from.
pub struct Context {
    pub config: AppConfig,
    pub store: FileCredentialStore,
}

impl Context {
    pub fn load() -> Result<Self> {
        Ok(Self {
            config: AppConfig::load_default()?,
            store: FileCredentialStore::new_default(),
        })
    }

    pub fn search_provider(&self) -> Result<Arc<dyn SearchProvider>> {
        Ok(Arc::new(ExaClient::from_store(&self.store, &self.config.http)?))
    }

    pub fn summary_provider(&self) -> Result<Arc<dyn CompletionProvider>> {
        Ok(Arc::new(ChatCompletionsClient::for_summaries(
            &self.store,
            &self.config.llm,
            &self.config.http,
        )?))
    }

    pub fn chat_provider(&self) -> Result<Arc<dyn CompletionProvider>> {
        Ok(Arc::new(ChatCompletionsClient::for_chat(
            &self.store,
            &self.config.llm,
            &self.config.http,
        )?))
    }

    pub fn payment_provider(&self) -> Result<Arc<dyn PaymentProvider>> {
        Ok(Arc::new(StripeClient::from_store(&self.store, &self.config.http)?))
    }

    pub fn taxonomy_provider(&self) -> Result<Arc<dyn TaxonomyProvider>> {
        Ok(Arc::new(WikidataClient::new(&self.config.http)?))
    }

    pub fn red_list_provider(&self) -> Result<Arc<dyn RedListProvider>> {
        Ok(Arc::new(IucnClient::from_store(&self.store, &self.config.http)?))
    }

    pub fn occurrence_provider(&self) -> Result<Arc<dyn OccurrenceProvider>> {
        Ok(Arc::new(GbifClient::new(&self.config.http)?))
    }
}

/// Look a channel table up in the user's store, then among the built-ins.
pub fn find_table(name: &str) -> Result<ChannelTable> {
    ChannelStore::new_default().load(name).ok_or_else(|| {
        let known: Vec<String> = ChannelStore::new_default()
            .list_all()
            .into_iter()
            .map(|t| t.name)
            .collect();
        CommandError::InvalidInput(format!(
            "Channel table '{}' not found. Available tables: {}",
            name,
            known.join(", ")
        ))
    })
}

/// Spinner on stderr; cleared by the caller with `finish_and_clear`.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}
