//! Turns a catalog candidate into the metadata record handed to the host.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::ImageCache;
use crate::{CandidateRecord, NormalizedMetadata};

/// Upper bound of the common rating scale.
pub const MAX_RATING: f64 = 10.0;

/// A catalog rating that could not be read as a number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("rating {raw:?} is not a number")]
pub struct RatingParseFailure {
    pub raw: String,
}

/// Parse a catalog rating and multiply it onto the 0–10 scale.
///
/// `rating_scale` is the catalog-specific multiplier: 2 for a catalog rating
/// out of 5, 0.1 for one out of 100. Blank ratings are `Ok(None)`.
pub fn rescale_rating(raw: &str, rating_scale: f64) -> Result<Option<f64>, RatingParseFailure> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed.parse().map_err(|_| RatingParseFailure {
        raw: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(RatingParseFailure {
            raw: raw.to_string(),
        });
    }
    Ok(Some((value * rating_scale).clamp(0.0, MAX_RATING)))
}

/// Trim genres and drop case-insensitive duplicates, keeping the first
/// spelling seen.
pub fn clean_genres<I, S>(genres: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    genres
        .into_iter()
        .filter_map(|g| {
            let trimmed = g.as_ref().trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Build the metadata record for `candidate`. Pure; an unreadable rating
/// leaves `community_rating` empty.
pub fn build_metadata(candidate: &CandidateRecord, rating_scale: f64) -> NormalizedMetadata {
    let community_rating = match candidate.raw_rating.as_deref() {
        Some(raw) => match rescale_rating(raw, rating_scale) {
            Ok(rating) => rating,
            Err(err) => {
                debug!(id = %candidate.external_id, error = %err, "ignoring rating");
                None
            }
        },
        None => None,
    };

    NormalizedMetadata {
        external_id: candidate.external_id.clone(),
        title: candidate.title.canonical.clone(),
        overview: candidate.overview.trim().to_string(),
        community_rating,
        genres: clean_genres(&candidate.genres),
        image_url: candidate
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        year: candidate.year,
    }
}

/// Builds metadata and records the candidate's image URL in the cache.
#[derive(Clone)]
pub struct MetadataAssembler {
    cache: Arc<dyn ImageCache>,
}

impl MetadataAssembler {
    pub fn new(cache: Arc<dyn ImageCache>) -> Self {
        Self { cache }
    }

    /// Cache failures are logged; they never change the returned record.
    pub async fn assemble(
        &self,
        candidate: &CandidateRecord,
        rating_scale: f64,
    ) -> NormalizedMetadata {
        let metadata = build_metadata(candidate, rating_scale);

        if let Some(url) = metadata.image_url.as_deref() {
            if let Err(err) = self.cache.store(&metadata.external_id, url).await {
                warn!(id = %metadata.external_id, error = %err, "failed to cache image url");
            }
        }

        metadata
    }
}
