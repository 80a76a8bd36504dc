use std::collections::BTreeSet;
use std::io::Read;
use std::sync::Arc;

use link_catalog_config::EngineConfig;
use link_catalog_models::{
    BulkResult, ContentGroup, ContentType, GroupKey, LinkPatch, LinkRecord, Mutation, ScrapeOutcome, ScrapeRequest,
    SearchHit,
};
use link_catalog_sources::{LinkStore, MetadataProvider, Sources};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aggregate::GroupAggregator;
use crate::bulk::{group_deletion_ops, BulkMutationCoordinator};
use crate::dispatch::{requests_from_groups, DispatchProgress, EpisodeSelection, ScrapeDispatcher};
use crate::enrich::MetadataEnricher;
use crate::error::{CatalogError, Result};
use crate::import::{parse_movie_csv, parse_series_csv, LinkResolver, ResolveReport, ResolveTarget};
use crate::poller::ReconciliationPoller;
use crate::range::expand_range;

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Entry point for every catalog action: listing, scraping, bulk edits and
/// direct inserts. Each call re-reads the store; nothing is cached.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn LinkStore>,
    metadata: Arc<dyn MetadataProvider>,
    enricher: MetadataEnricher,
    aggregator: GroupAggregator,
    dispatcher: ScrapeDispatcher,
    bulk: BulkMutationCoordinator,
    resolver: LinkResolver,
    full_season_episodes: u32,
}

impl CatalogService {
    pub fn new(sources: Sources, engine: &EngineConfig) -> Self {
        let enricher = MetadataEnricher::new(sources.metadata.clone(), engine.metadata_timeout());
        let poller = ReconciliationPoller::new(sources.store.clone(), engine.poll_attempts, engine.poll_delay());
        Self {
            aggregator: GroupAggregator::new(enricher.clone()),
            dispatcher: ScrapeDispatcher::new(sources.worker.clone(), poller),
            bulk: BulkMutationCoordinator::new(sources.store.clone()),
            resolver: LinkResolver::new(sources.store.clone(), sources.worker, engine.resolve_timeout()),
            enricher,
            store: sources.store,
            metadata: sources.metadata,
            full_season_episodes: engine.full_season_episodes,
        }
    }

    pub fn expand_range(&self, text: &str) -> Vec<u32> {
        expand_range(text)
    }

    /// Groups already-fetched records
    pub async fn aggregate(&self, records: &[LinkRecord], content_type: ContentType) -> Vec<ContentGroup> {
        self.aggregator.aggregate(records, content_type).await
    }

    /// Reads every row of the collection (newest first) and groups it
    #[instrument(skip(self))]
    pub async fn groups(&self, content_type: ContentType) -> Result<Vec<ContentGroup>> {
        let records = self.store.select_all(content_type).await?;
        Ok(self.aggregate(&records, content_type).await)
    }

    pub async fn dispatch_scrape(
        &self,
        content_type: ContentType,
        requests: Vec<ScrapeRequest>,
        progress: &dyn DispatchProgress,
    ) -> ScrapeOutcome {
        self.dispatcher.dispatch(content_type, requests, progress).await
    }

    pub async fn scrape_movie(&self, id: u64, title: &str, progress: &dyn DispatchProgress) -> ScrapeOutcome {
        self.dispatch_scrape(ContentType::Movie, vec![ScrapeRequest::movie(id, title)], progress)
            .await
    }

    /// Scrapes selected movie groups, titled from a fresh listing
    #[instrument(skip(self, keys, progress), fields(selected = keys.len()))]
    pub async fn scrape_movie_groups(&self, keys: &[GroupKey], progress: &dyn DispatchProgress) -> Result<ScrapeOutcome> {
        let items = self.selected_items(ContentType::Movie, keys).await?;
        let requests = ScrapeDispatcher::movie_requests(&items);
        Ok(self.dispatch_scrape(ContentType::Movie, requests, progress).await)
    }

    /// One request per series and selected episode of `season`
    pub async fn scrape_series(
        &self,
        series: &[(u64, String)],
        season: u32,
        selection: &EpisodeSelection,
        progress: &dyn DispatchProgress,
    ) -> Result<ScrapeOutcome> {
        if series.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        if season == 0 {
            return Err(CatalogError::MissingIdentifier("season must be at least 1".to_string()));
        }
        let episodes = selection.resolve(self.full_season_episodes)?;
        info!(
            "Scraping {} series, season {}, {} episode(s) each",
            series.len(),
            season,
            episodes.len()
        );
        let requests = ScrapeDispatcher::episode_requests(series, season, &episodes);
        Ok(self.dispatch_scrape(ContentType::Series, requests, progress).await)
    }

    #[instrument(skip(self, keys, selection, progress), fields(selected = keys.len()))]
    pub async fn scrape_series_groups(
        &self,
        keys: &[GroupKey],
        season: u32,
        selection: &EpisodeSelection,
        progress: &dyn DispatchProgress,
    ) -> Result<ScrapeOutcome> {
        // Validate the selector before touching the store
        selection.resolve(self.full_season_episodes)?;
        let items = self.selected_items(ContentType::Series, keys).await?;
        self.scrape_series(&items, season, selection, progress).await
    }

    async fn selected_items(&self, content_type: ContentType, keys: &[GroupKey]) -> Result<Vec<(u64, String)>> {
        if keys.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        let groups = self.groups(content_type).await?;
        let items = requests_from_groups(&groups, keys);
        if items.is_empty() {
            return Err(CatalogError::MissingIdentifier(
                "none of the selected groups has an external id".to_string(),
            ));
        }
        Ok(items)
    }

    pub async fn bulk_mutate(&self, content_type: ContentType, operations: &[Mutation]) -> BulkResult {
        self.bulk.run(content_type, operations).await
    }

    /// Deletes every link of the selected groups, one delete per link
    #[instrument(skip(self, keys), fields(selected = keys.len()))]
    pub async fn delete_groups(&self, content_type: ContentType, keys: &[GroupKey]) -> Result<BulkResult> {
        if keys.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        let records = self.store.select_all(content_type).await?;
        let snapshot = crate::aggregate::fold_records(&records);
        self.delete_groups_in(content_type, &snapshot, keys).await
    }

    /// Like [`Self::delete_groups`] but against a listing the caller already holds
    pub async fn delete_groups_in(
        &self,
        content_type: ContentType,
        snapshot: &[ContentGroup],
        keys: &[GroupKey],
    ) -> Result<BulkResult> {
        let ops = group_deletion_ops(snapshot, keys)?;
        Ok(self.bulk_mutate(content_type, &ops).await)
    }

    pub async fn delete_links(&self, content_type: ContentType, ids: &[i64]) -> Result<BulkResult> {
        if ids.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        let ops: Vec<Mutation> = ids.iter().map(|&id| Mutation::Delete { id }).collect();
        Ok(self.bulk_mutate(content_type, &ops).await)
    }

    pub async fn edit_link(&self, content_type: ContentType, id: i64, patch: LinkPatch) -> Result<BulkResult> {
        if patch.is_empty() {
            return Err(CatalogError::EmptyPatch(id));
        }
        Ok(self.bulk_mutate(content_type, &[Mutation::Update { id, patch }]).await)
    }

    /// Parses a CSV paste and inserts the valid rows in one batch
    #[instrument(skip(self, input))]
    pub async fn import_csv<R: Read + Send>(&self, content_type: ContentType, input: R) -> Result<ImportReport> {
        let import = match content_type {
            ContentType::Movie => parse_movie_csv(input)?,
            ContentType::Series => parse_series_csv(input)?,
        };
        if import.skipped > 0 {
            warn!("Skipped {} incomplete CSV row(s)", import.skipped);
        }
        let inserted = self.store.insert(content_type, &import.rows).await?;
        info!("Imported {} {} link(s)", inserted.len(), content_type);
        Ok(ImportReport {
            inserted: inserted.len(),
            skipped: import.skipped,
        })
    }

    pub async fn resolve_and_insert(&self, content_type: ContentType, targets: &[ResolveTarget]) -> Result<ResolveReport> {
        self.resolver.resolve_and_insert(content_type, targets).await
    }

    /// Resolves links for ids, titling each from the metadata provider.
    /// Ids the provider does not know are reported as skipped.
    pub async fn resolve_ids(
        &self,
        content_type: ContentType,
        ids: &[u64],
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<ResolveReport> {
        if ids.is_empty() {
            return Err(CatalogError::EmptySelection);
        }
        let wanted: BTreeSet<u64> = ids.iter().copied().collect();
        let metadata = self.enricher.enrich(&wanted, content_type).await;

        let mut unknown = Vec::new();
        let targets: Vec<ResolveTarget> = wanted
            .iter()
            .filter_map(|id| {
                let title = metadata.get(id).and_then(|m| m.title.clone());
                if title.is_none() {
                    unknown.push(id.to_string());
                }
                Some(ResolveTarget {
                    external_content_id: *id,
                    title: title?,
                    season,
                    episode,
                })
            })
            .collect();

        if targets.is_empty() {
            return Err(CatalogError::MissingIdentifier(format!(
                "no title found for {} id(s) {}",
                content_type,
                unknown.join(", ")
            )));
        }
        let mut report = self.resolve_and_insert(content_type, &targets).await?;
        report.skipped.extend(unknown);
        Ok(report)
    }

    pub async fn search(&self, query: &str, content_type: ContentType) -> Result<Vec<SearchHit>> {
        Ok(self.metadata.search(query, content_type).await?)
    }
}
