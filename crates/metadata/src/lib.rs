#![allow(clippy::type_complexity)]
pub mod anisearch;
pub mod assemble;
pub mod cache;
pub mod fetch;
pub mod kitsu;
pub mod matcher;
pub mod provider;
pub mod resolver;
pub mod source;

use std::path::PathBuf;

use thiserror::Error;

pub use anifin_core::types::{CandidateRecord, NormalizedMetadata, RawQuery, TitleVariants};

#[derive(Error, Debug)]
pub enum MetadataError {
    /// Transport failure: connection error, timeout or non-success status.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    /// The response body did not have the structure the adapter expects.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("not found")]
    NotFound,
    #[error("image cache error: {0}")]
    Cache(#[from] std::io::Error),
}

/// Settings shared by the catalog adapters.
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub kitsu_url: String,
    pub anisearch_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub cache_dir: PathBuf,
    /// Provider names (case-insensitive) that should not be registered.
    pub disabled_providers: Vec<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            kitsu_url: kitsu::BASE_URL.to_string(),
            anisearch_url: anisearch::BASE_URL.to_string(),
            user_agent: concat!("anifin/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            cache_dir: PathBuf::from("/tmp/anifin_cache"),
            disabled_providers: Vec::new(),
        }
    }
}

impl MetadataConfig {
    pub fn is_enabled(&self, provider: &str) -> bool {
        !self
            .disabled_providers
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(provider))
    }
}
