use std::collections::BTreeSet;
use std::sync::Arc;

use link_catalog_models::{ContentGroup, ContentType, GroupKey, ItemState, ScrapeItemReport, ScrapeOutcome, ScrapeRequest};
use link_catalog_sources::ScrapeWorker;
use tracing::{info, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::poller::ReconciliationPoller;
use crate::range::{expand_range, selection_size};

/// Most episodes a single selector may request
pub const MAX_SELECTED_EPISODES: u64 = 1000;

/// Which episodes of a season to request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeSelection {
    /// Episodes `1..=n` where `n` is the configured season length
    FullSeason,
    /// A selector such as "1-3,5"
    Episodes(String),
}

impl EpisodeSelection {
    pub fn resolve(&self, full_season_episodes: u32) -> Result<Vec<u32>> {
        match self {
            EpisodeSelection::FullSeason => Ok((1..=full_season_episodes).collect()),
            EpisodeSelection::Episodes(text) => {
                let requested = selection_size(text);
                if requested > MAX_SELECTED_EPISODES {
                    return Err(CatalogError::SelectionTooLarge {
                        requested,
                        max: MAX_SELECTED_EPISODES,
                    });
                }
                let episodes = expand_range(text);
                if episodes.is_empty() {
                    return Err(CatalogError::NoEpisodesResolved(text.clone()));
                }
                Ok(episodes)
            }
        }
    }
}

/// Progress hooks for long dispatches
pub trait DispatchProgress: Send + Sync {
    fn item_started(&self, _request: &ScrapeRequest, _index: usize, _total: usize) {}
    fn item_finished(&self, _report: &ScrapeItemReport) {}
    fn reconciling(&self, _pending: usize) {}
}

/// No-op progress sink
pub struct Silent;

impl DispatchProgress for Silent {}

/// Builds scrape requests for selected groups of a fresh listing.
///
/// Orphan keys are skipped. Titles come from the group, falling back to the
/// first member's title and then "Unknown".
pub fn requests_from_groups(groups: &[ContentGroup], selected: &[GroupKey]) -> Vec<(u64, String)> {
    selected
        .iter()
        .filter_map(|key| {
            let Some(id) = key.content_id() else {
                warn!("Skipping {}: links without an id cannot be scraped", key);
                return None;
            };
            let group = groups.iter().find(|g| g.key == *key);
            let title = group
                .map(|g| g.display_title.clone())
                .filter(|t| !t.trim().is_empty())
                .or_else(|| group.and_then(|g| g.members.first()).map(|m| m.fallback_title().to_string()))
                .unwrap_or_else(|| "Unknown".to_string());
            Some((id, title))
        })
        .collect()
}

/// Sends requests to the scrape worker one at a time, then waits for the
/// rows of the successful ones to become visible.
#[derive(Clone)]
pub struct ScrapeDispatcher {
    worker: Arc<dyn ScrapeWorker>,
    poller: ReconciliationPoller,
}

impl ScrapeDispatcher {
    pub fn new(worker: Arc<dyn ScrapeWorker>, poller: ReconciliationPoller) -> Self {
        Self { worker, poller }
    }

    /// Movie requests for `(id, title)` pairs
    pub fn movie_requests(items: &[(u64, String)]) -> Vec<ScrapeRequest> {
        items.iter().map(|(id, title)| ScrapeRequest::movie(*id, title.clone())).collect()
    }

    /// One request per series and episode, series-major
    pub fn episode_requests(series: &[(u64, String)], season: u32, episodes: &[u32]) -> Vec<ScrapeRequest> {
        series
            .iter()
            .flat_map(|(id, title)| {
                episodes
                    .iter()
                    .map(move |&episode| ScrapeRequest::episode(*id, title.clone(), season, episode))
            })
            .collect()
    }

    #[instrument(skip(self, requests, progress), fields(worker = self.worker.worker_name(), items = requests.len()))]
    pub async fn dispatch(
        &self,
        content_type: ContentType,
        requests: Vec<ScrapeRequest>,
        progress: &dyn DispatchProgress,
    ) -> ScrapeOutcome {
        let total = requests.len();
        let mut outcome = ScrapeOutcome {
            attempted: total,
            ..Default::default()
        };
        let mut scraped: BTreeSet<u64> = BTreeSet::new();

        for (index, request) in requests.into_iter().enumerate() {
            progress.item_started(&request, index, total);
            let mut report = ScrapeItemReport {
                request,
                state: ItemState::Requested,
            };

            match self.worker.scrape(&report.request).await {
                Ok(reply) if reply.success => {
                    let links = reply.credited_links();
                    info!("{}: worker found {} link(s)", report.request.label(), links);
                    outcome.links_found += links;
                    outcome.succeeded_items += 1;
                    scraped.insert(report.request.external_content_id);
                    report.state = ItemState::Succeeded { links };
                }
                Ok(_) => {
                    warn!("{}: worker reported no success", report.request.label());
                    outcome.failed_external_ids.insert(report.request.external_content_id);
                    report.state = ItemState::Failed {
                        reason: "worker reported no success".to_string(),
                    };
                }
                Err(e) => {
                    warn!("{}: scrape request failed: {}", report.request.label(), e);
                    outcome.failed_external_ids.insert(report.request.external_content_id);
                    report.state = ItemState::Failed { reason: e.to_string() };
                }
            }

            progress.item_finished(&report);
            outcome.items.push(report);
        }

        // A series with any successful episode is reconciled, not failed
        outcome.failed_external_ids.retain(|id| !scraped.contains(id));

        progress.reconciling(scraped.len());
        let pending = self.poller.poll(content_type, &scraped).await;

        for item in outcome.items.iter_mut() {
            if let ItemState::Succeeded { links } = item.state {
                item.state = if pending.contains(&item.request.external_content_id) {
                    ItemState::TimedOut { links }
                } else {
                    ItemState::Visible { links }
                };
            }
        }
        outcome.pending_external_ids = pending;

        info!("Scrape finished: {}", outcome.summary());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fold_records;
    use crate::fakes::{movie_row, orphan_row, FakeStore, FakeWorker};
    use std::time::Duration;

    fn dispatcher(worker: FakeWorker, store: Arc<FakeStore>, attempts: u32) -> ScrapeDispatcher {
        ScrapeDispatcher::new(
            Arc::new(worker),
            ReconciliationPoller::new(store, attempts, Duration::from_millis(1)),
        )
    }

    #[test]
    fn test_full_season_expands_to_configured_length() {
        assert_eq!(EpisodeSelection::FullSeason.resolve(30).unwrap().len(), 30);
        assert_eq!(EpisodeSelection::FullSeason.resolve(3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_selector_is_rejected() {
        let err = EpisodeSelection::Episodes("x,0".into()).resolve(30).unwrap_err();
        assert!(matches!(err, CatalogError::NoEpisodesResolved(_)));
    }

    #[test]
    fn test_oversized_selector_is_rejected_not_dropped() {
        let err = EpisodeSelection::Episodes("1-100000,3".into()).resolve(30).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::SelectionTooLarge {
                requested: 100_001,
                max: MAX_SELECTED_EPISODES
            }
        ));
        assert_eq!(EpisodeSelection::Episodes("1-1000".into()).resolve(30).unwrap().len(), 1000);
    }

    #[test]
    fn test_episode_requests_are_series_major() {
        let requests = ScrapeDispatcher::episode_requests(
            &[(1, "A".to_string()), (2, "B".to_string())],
            1,
            &[1, 2],
        );
        let labels: Vec<_> = requests.iter().map(ScrapeRequest::label).collect();
        assert_eq!(labels, vec!["A (1) S1E1", "A (1) S1E2", "B (2) S1E1", "B (2) S1E2"]);
    }

    #[test]
    fn test_requests_from_groups_skip_orphans() {
        let groups = fold_records(&[movie_row(1, Some(603), "The Matrix"), orphan_row(2, "loose")]);
        let items = requests_from_groups(&groups, &[GroupKey::Content(603), GroupKey::Orphan(2), GroupKey::Content(7)]);
        assert_eq!(items, vec![(603, "The Matrix".to_string()), (7, "Unknown".to_string())]);
    }

    #[tokio::test]
    async fn test_single_movie_scrape_becomes_visible() {
        let store = Arc::new(FakeStore::default());
        let worker = FakeWorker::new().writing_to(store.clone()).reply(603, true, 3, 1);
        let dispatcher = dispatcher(worker, store.clone(), 8);

        let outcome = dispatcher
            .dispatch(ContentType::Movie, vec![ScrapeRequest::movie(603, "The Matrix")], &Silent)
            .await;

        assert_eq!(outcome.attempted, 1);
        assert_eq!(outcome.succeeded_items, 1);
        assert_eq!(outcome.links_found, 3);
        assert!(!outcome.has_pending());
        assert_eq!(outcome.items[0].state, ItemState::Visible { links: 3 });
        assert_eq!(store.select_calls(), 2);
    }

    #[tokio::test]
    async fn test_worker_errors_count_as_zero_and_batch_continues() {
        let store = Arc::new(FakeStore::default());
        let worker = FakeWorker::new()
            .writing_to(store.clone())
            .erroring(1)
            .reply(2, false, 9, 0)
            .reply(3, true, 2, 0);
        let dispatcher = dispatcher(worker, store, 2);
        let requests = ScrapeDispatcher::movie_requests(&[
            (1, "a".to_string()),
            (2, "b".to_string()),
            (3, "c".to_string()),
            (4, "d".to_string()),
        ]);

        let outcome = dispatcher.dispatch(ContentType::Movie, requests, &Silent).await;
        assert_eq!(outcome.attempted, 4);
        assert_eq!(outcome.succeeded_items, 1);
        assert_eq!(outcome.links_found, 2);
        assert_eq!(outcome.failed_external_ids, BTreeSet::from([1, 2, 4]));
        assert_eq!(outcome.summary(), "Found 2 link(s) across 1/4 item(s)");
    }

    #[tokio::test]
    async fn test_invisible_rows_are_pending_not_failed() {
        let store = Arc::new(FakeStore::default());
        let worker = FakeWorker::new().writing_to(store.clone()).reply(1396, true, 1, 50);
        let dispatcher = dispatcher(worker, store, 3);
        let requests = ScrapeDispatcher::episode_requests(&[(1396, "Breaking Bad".to_string())], 1, &[1]);

        let outcome = dispatcher.dispatch(ContentType::Series, requests, &Silent).await;
        assert_eq!(outcome.succeeded_items, 1);
        assert!(outcome.failed_external_ids.is_empty());
        assert_eq!(outcome.pending_external_ids, BTreeSet::from([1396]));
        assert_eq!(outcome.items[0].state, ItemState::TimedOut { links: 1 });
    }

    #[tokio::test]
    async fn test_partially_failed_series_is_not_reported_failed() {
        let store = Arc::new(FakeStore::default());
        let worker = FakeWorker::new()
            .writing_to(store.clone())
            .reply(1396, true, 1, 0)
            .erroring_episode(1396, 2)
            .erroring(42);
        let dispatcher = dispatcher(worker, store, 2);
        let requests = ScrapeDispatcher::episode_requests(
            &[(1396, "Breaking Bad".to_string()), (42, "Other".to_string())],
            1,
            &[1, 2],
        );

        let outcome = dispatcher.dispatch(ContentType::Series, requests, &Silent).await;
        assert_eq!(outcome.succeeded_items, 1);
        assert_eq!(outcome.failed_external_ids, BTreeSet::from([42]));
        assert!(outcome.pending_external_ids.is_empty());
        assert_eq!(outcome.items[0].state, ItemState::Visible { links: 1 });
        assert!(matches!(outcome.items[1].state, ItemState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_requests_are_sent_in_order() {
        let store = Arc::new(FakeStore::default());
        let worker = Arc::new(FakeWorker::new());
        let dispatcher = ScrapeDispatcher::new(
            worker.clone(),
            ReconciliationPoller::new(store, 1, Duration::from_millis(1)),
        );
        let requests = ScrapeDispatcher::episode_requests(&[(5, "S".to_string())], 2, &[3, 1, 2]);

        dispatcher.dispatch(ContentType::Series, requests, &Silent).await;
        let episodes: Vec<_> = worker.calls().iter().filter_map(|r| r.episode).collect();
        assert_eq!(episodes, vec![3, 1, 2]);
    }
}
