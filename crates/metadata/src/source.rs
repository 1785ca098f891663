use crate::{CandidateRecord, MetadataError};

/// An external catalog that can look up anime series.
///
/// Implementations map missing optional upstream fields (rating, image,
/// genres) to empty values instead of failing.
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    /// Direct lookup by the catalog's own identifier. An unknown identifier
    /// yields `Ok(None)`.
    async fn find_by_id(&self, id: &str) -> Result<Option<CandidateRecord>, MetadataError>;

    /// Free-text search, in the catalog's relevance order.
    async fn search(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Vec<CandidateRecord>, MetadataError>;
}
