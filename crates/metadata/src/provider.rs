//! Catalog providers as the host sees them: a source plus the resolution and
//! assembly settings that belong to it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use anifin_core::types::{ImageKind, RemoteImage};

use crate::anisearch::{self, AniSearchClient};
use crate::assemble::{MetadataAssembler, build_metadata};
use crate::cache::{FileImageCache, ImageCache};
use crate::kitsu::{self, KitsuClient};
use crate::matcher::TitleMatcher;
use crate::resolver::Resolver;
use crate::source::CatalogSource;
use crate::{CandidateRecord, MetadataConfig, MetadataError, NormalizedMetadata, RawQuery};

/// One selectable search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub provider: String,
    pub metadata: NormalizedMetadata,
    pub candidate: CandidateRecord,
}

/// Result of asking every provider in turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMatch {
    pub provider: String,
    pub metadata: NormalizedMetadata,
}

pub struct MetadataProvider {
    name: String,
    order: i32,
    rating_scale: f64,
    source: Arc<dyn CatalogSource>,
    resolver: Resolver,
    cache: Arc<dyn ImageCache>,
    assembler: MetadataAssembler,
}

impl MetadataProvider {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        order: i32,
        rating_scale: f64,
        cache: Arc<dyn ImageCache>,
    ) -> Self {
        Self {
            name: source.name().to_string(),
            order,
            rating_scale,
            resolver: Resolver::new(source.clone()),
            source,
            assembler: MetadataAssembler::new(cache.clone()),
            cache,
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn TitleMatcher>) -> Self {
        self.resolver = self.resolver.with_matcher(matcher);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    /// Metadata for the single entry the query resolves to. The entry's image
    /// URL is cached for later image requests.
    pub async fn metadata(
        &self,
        query: &RawQuery,
    ) -> Result<Option<NormalizedMetadata>, MetadataError> {
        match self.resolver.resolve_one(query).await? {
            Some(candidate) => Ok(Some(
                self.assembler.assemble(&candidate, self.rating_scale).await,
            )),
            None => Ok(None),
        }
    }

    /// Every entry a user could pick from, without touching the image cache.
    pub async fn search(&self, query: &RawQuery) -> Result<Vec<SearchHit>, MetadataError> {
        let candidates = self.resolver.resolve_many(query).await?;
        Ok(candidates
            .into_iter()
            .map(|candidate| SearchHit {
                provider: self.name.clone(),
                metadata: build_metadata(&candidate, self.rating_scale),
                candidate,
            })
            .collect())
    }

    /// Primary image for an entry, from the cache or else the catalog.
    pub async fn images(&self, id: &str) -> Result<Vec<RemoteImage>, MetadataError> {
        let cached = match self.cache.load(id).await {
            Ok(url) => url,
            Err(err) => {
                warn!(provider = %self.name, id, error = %err, "image cache read failed");
                None
            }
        };

        let url = match cached {
            Some(url) => Some(url),
            None => self
                .source
                .find_by_id(id)
                .await?
                .and_then(|c| build_metadata(&c, self.rating_scale).image_url),
        };

        Ok(url
            .map(|url| RemoteImage {
                provider: self.name.clone(),
                kind: ImageKind::Primary,
                url,
            })
            .into_iter()
            .collect())
    }
}

/// Providers in the order they are consulted.
pub struct ProviderRegistry {
    providers: Vec<MetadataProvider>,
}

impl ProviderRegistry {
    pub fn new(mut providers: Vec<MetadataProvider>) -> Self {
        providers.sort_by_key(|p| p.order);
        Self { providers }
    }

    /// Kitsu and AniSearch with file-backed image caches, minus any provider
    /// the config disables.
    pub fn from_config(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let mut providers = Vec::new();

        if config.is_enabled(kitsu::NAME) {
            providers.push(MetadataProvider::new(
                Arc::new(KitsuClient::new(config)?),
                kitsu::ORDER,
                kitsu::RATING_SCALE,
                Arc::new(FileImageCache::new(&config.cache_dir, kitsu::NAME)),
            ));
        }
        if config.is_enabled(anisearch::NAME) {
            providers.push(MetadataProvider::new(
                Arc::new(AniSearchClient::new(config)?),
                anisearch::ORDER,
                anisearch::RATING_SCALE,
                Arc::new(FileImageCache::new(&config.cache_dir, anisearch::NAME)),
            ));
        }

        info!(
            providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "metadata providers registered"
        );
        Ok(Self::new(providers))
    }

    pub fn get(&self, name: &str) -> Option<&MetadataProvider> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataProvider> {
        self.providers.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Ask each provider in order and return the first metadata found.
    ///
    /// Identifiers are scoped to one catalog, so the query's own `known_id`
    /// is not forwarded. Only a `[provider=id]` tag in the title gives a
    /// provider its known id. Providers that fail are logged and skipped.
    pub async fn first_match(&self, query: &RawQuery) -> Option<ProviderMatch> {
        let tagged = anifin_scanner::extract_provider_ids(&query.title);
        if let Some(id) = query.known_id() {
            debug!(id, "ignoring untagged known id for cross-provider lookup");
        }

        for provider in &self.providers {
            let scoped = RawQuery {
                known_id: tagged
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(&provider.name))
                    .map(|(_, id)| id.clone()),
                ..query.clone()
            };

            match provider.metadata(&scoped).await {
                Ok(Some(metadata)) => {
                    debug!(provider = %provider.name, id = %metadata.external_id, "provider matched");
                    return Some(ProviderMatch {
                        provider: provider.name.clone(),
                        metadata,
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(provider = %provider.name, error = %err, "provider failed, trying next");
                }
            }
        }
        None
    }
}
