//! Reduces catalog candidates to the entry (or entries) a query refers to.
//!
//! Resolution rules:
//! 1. A known identifier that the catalog recognizes always wins; no title
//!    search is issued.
//! 2. Otherwise the normalized title is searched and the first result whose
//!    title matches (per the configured `TitleMatcher`) is taken.
//! 3. No match means no metadata. There is no best-guess fallback.
//!
//! Errors from the catalog are returned as-is. Nothing here retries.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::matcher::{ExactTitleMatch, TitleMatcher};
use crate::source::CatalogSource;
use crate::{CandidateRecord, MetadataError, RawQuery};

#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn CatalogSource>,
    matcher: Arc<dyn TitleMatcher>,
}

impl Resolver {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            matcher: Arc::new(ExactTitleMatch),
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn TitleMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Find the single entry to populate metadata from.
    pub async fn resolve_one(
        &self,
        query: &RawQuery,
    ) -> Result<Option<CandidateRecord>, MetadataError> {
        let catalog = self.source.name();

        if let Some(id) = query.known_id() {
            if let Some(found) = self.source.find_by_id(id).await? {
                debug!(catalog, id, "resolved by known id");
                return Ok(Some(found));
            }
            debug!(catalog, id, "known id not found, falling back to title search");
        }

        if query.title.trim().is_empty() {
            return Ok(None);
        }

        let title = anifin_scanner::normalize(&query.title);
        info!(catalog, title = %title, year = ?query.year, "searching");

        let results = self.source.search(&title, query.year).await?;
        let hit = results
            .into_iter()
            .find(|candidate| self.matcher.matches(&title, &candidate.title));

        match &hit {
            Some(c) => debug!(catalog, id = %c.external_id, "title matched"),
            None => debug!(catalog, title = %title, "no exact title match"),
        }
        Ok(hit)
    }

    /// Collect every entry a user could pick from, identifier result first,
    /// one entry per identifier.
    pub async fn resolve_many(
        &self,
        query: &RawQuery,
    ) -> Result<Vec<CandidateRecord>, MetadataError> {
        let by_id = async {
            match query.known_id() {
                Some(id) => self.source.find_by_id(id).await,
                None => Ok(None),
            }
        };
        let by_title = async {
            if query.title.trim().is_empty() {
                return Ok(Vec::new());
            }
            let title = anifin_scanner::normalize(&query.title);
            self.source.search(&title, query.year).await
        };

        let (by_id, by_title) = tokio::join!(by_id, by_title);
        let (by_id, by_title) = (by_id?, by_title?);

        let mut seen = HashSet::new();
        let results: Vec<CandidateRecord> = by_id
            .into_iter()
            .chain(by_title)
            .filter(|c| seen.insert(c.external_id.clone()))
            .collect();

        debug!(catalog = self.source.name(), count = results.len(), "search resolved");
        Ok(results)
    }
}
