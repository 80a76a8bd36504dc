use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use link_catalog_models::{ContentMetadata, ContentType};
use link_catalog_sources::MetadataProvider;
use tracing::{debug, warn};

/// Batched, failure-tolerant metadata lookups.
///
/// One lookup per id runs concurrently; ids whose lookup errors, times out or
/// finds nothing are simply absent from the result.
#[derive(Clone)]
pub struct MetadataEnricher {
    provider: Arc<dyn MetadataProvider>,
    timeout: Duration,
}

impl MetadataEnricher {
    pub fn new(provider: Arc<dyn MetadataProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn enrich(&self, ids: &BTreeSet<u64>, content_type: ContentType) -> HashMap<u64, ContentMetadata> {
        if ids.is_empty() {
            return HashMap::new();
        }

        let lookups = ids.iter().map(|&id| async move {
            match tokio::time::timeout(self.timeout, self.provider.lookup_by_id(id, content_type)).await {
                Ok(Ok(Some(metadata))) => Some((id, metadata)),
                Ok(Ok(None)) => {
                    debug!("No metadata for {} {}", content_type, id);
                    None
                }
                Ok(Err(e)) => {
                    warn!("Metadata lookup failed for {} {}: {}", content_type, id, e);
                    None
                }
                Err(_) => {
                    warn!("Metadata lookup for {} {} timed out after {:?}", content_type, id, self.timeout);
                    None
                }
            }
        });

        let resolved: HashMap<u64, ContentMetadata> = join_all(lookups).await.into_iter().flatten().collect();
        debug!(
            "Enriched {}/{} {} id(s) via {}",
            resolved.len(),
            ids.len(),
            content_type,
            self.provider.provider_name()
        );
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeMetadata;

    fn ids(values: &[u64]) -> BTreeSet<u64> {
        values.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_partial_failure_yields_partial_mapping() {
        let provider = FakeMetadata::default()
            .with_title(603, "The Matrix")
            .with_title(604, "The Matrix Reloaded")
            .failing(605);
        let enricher = MetadataEnricher::new(Arc::new(provider), Duration::from_secs(5));

        let found = enricher.enrich(&ids(&[603, 604, 605, 999]), ContentType::Movie).await;
        assert_eq!(found.len(), 2);
        assert_eq!(found[&603].title.as_deref(), Some("The Matrix"));
        assert!(!found.contains_key(&605));
        assert!(!found.contains_key(&999));
    }

    #[tokio::test]
    async fn test_unavailable_provider_yields_empty_mapping() {
        let provider = FakeMetadata::default().unavailable();
        let enricher = MetadataEnricher::new(Arc::new(provider), Duration::from_secs(5));

        let found = enricher.enrich(&ids(&[1, 2, 3]), ContentType::Series).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_slow_lookup_is_skipped() {
        let provider = FakeMetadata::default()
            .with_title(1, "Fast")
            .with_title(2, "Slow")
            .slow(2, Duration::from_millis(500));
        let enricher = MetadataEnricher::new(Arc::new(provider), Duration::from_millis(50));

        let found = enricher.enrich(&ids(&[1, 2]), ContentType::Movie).await;
        assert!(found.contains_key(&1));
        assert!(!found.contains_key(&2));
    }
}
