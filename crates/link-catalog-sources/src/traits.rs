use async_trait::async_trait;
use link_catalog_models::{ContentMetadata, ContentType, LinkPatch, LinkRecord, NewLink, ScrapeRequest, SearchHit};

use crate::error::SourceError;
use crate::store::LinkFilter;
use crate::worker::{ResolveQuery, ResolvedLink, WorkerReply};

/// The data store holding the link collections.
///
/// Every call reports failure explicitly; an empty `Vec` is a successful read
/// that matched nothing.
#[async_trait]
pub trait LinkStore: Send + Sync {
    fn store_name(&self) -> &str;

    /// Rows of one collection, newest first
    async fn select(&self, content_type: ContentType, filter: &LinkFilter) -> Result<Vec<LinkRecord>, SourceError>;

    async fn insert(&self, content_type: ContentType, rows: &[NewLink]) -> Result<Vec<LinkRecord>, SourceError>;

    /// Fails with `NotFound` when no row has `id`
    async fn update(&self, content_type: ContentType, id: i64, patch: &LinkPatch) -> Result<(), SourceError>;

    /// Fails with `NotFound` when no row has `id`
    async fn delete(&self, content_type: ContentType, id: i64) -> Result<(), SourceError>;

    async fn select_all(&self, content_type: ContentType) -> Result<Vec<LinkRecord>, SourceError> {
        self.select(content_type, &LinkFilter::default()).await
    }
}

/// Keyed metadata lookups (title + poster) against the catalog provider
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// `Ok(None)` when the provider has no entry for `id`
    async fn lookup_by_id(&self, id: u64, content_type: ContentType) -> Result<Option<ContentMetadata>, SourceError>;

    async fn search(&self, _query: &str, _content_type: ContentType) -> Result<Vec<SearchHit>, SourceError> {
        Ok(Vec::new())
    }
}

/// The external scrape worker. Rows it finds are written to the store
/// asynchronously; replies only carry the worker's own tally.
#[async_trait]
pub trait ScrapeWorker: Send + Sync {
    fn worker_name(&self) -> &str;

    /// Movie requests go to the movie endpoint, requests with season and
    /// episode go to the episode endpoint
    async fn scrape(&self, request: &ScrapeRequest) -> Result<WorkerReply, SourceError>;

    async fn resolve(&self, query: &ResolveQuery) -> Result<Vec<ResolvedLink>, SourceError>;
}
