//! In-memory stand-ins for the store, metadata provider and scrape worker.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use link_catalog_models::{ContentMetadata, ContentType, LinkPatch, LinkRecord, NewLink, ScrapeRequest, SearchHit};
use link_catalog_sources::{
    LinkFilter, LinkStore, MetadataProvider, ResolveQuery, ResolvedLink, ScrapeWorker, SourceError, WorkerReply,
};

fn timestamp(id: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + id, 0).unwrap()
}

pub fn movie_row(id: i64, external_id: Option<u64>, title: &str) -> LinkRecord {
    LinkRecord {
        id,
        external_content_id: external_id,
        title: title.to_string(),
        url: format!("https://links.test/{}", id),
        series_title: None,
        season_number: None,
        episode_number: None,
        created_at: timestamp(id),
    }
}

pub fn orphan_row(id: i64, title: &str) -> LinkRecord {
    movie_row(id, None, title)
}

pub fn series_row(id: i64, external_id: Option<u64>, series_title: &str, season: u32, episode: u32) -> LinkRecord {
    LinkRecord {
        id,
        external_content_id: external_id,
        title: format!("{} S{}E{}", series_title, season, episode),
        url: format!("https://links.test/{}", id),
        series_title: Some(series_title.to_string()),
        season_number: Some(season),
        episode_number: Some(episode),
        created_at: timestamp(id),
    }
}

fn unreachable() -> SourceError {
    SourceError::Unreachable {
        service: "fake-store",
        message: "connection refused".to_string(),
    }
}

struct HiddenRow {
    content_type: ContentType,
    link: NewLink,
    /// Matching selects that will still miss this row
    remaining: u32,
}

#[derive(Default)]
struct StoreState {
    rows: HashMap<ContentType, Vec<LinkRecord>>,
    hidden: Vec<HiddenRow>,
    next_id: i64,
    mutations: usize,
    unreachable_after: Option<usize>,
    failing_selects: HashSet<u64>,
    select_calls: usize,
}

impl StoreState {
    fn materialize(&mut self, content_type: ContentType, link: NewLink) -> LinkRecord {
        self.next_id += 1;
        let record = LinkRecord {
            id: self.next_id,
            external_content_id: link.external_content_id,
            title: link.title,
            url: link.url,
            series_title: link.series_title,
            season_number: link.season_number,
            episode_number: link.episode_number,
            created_at: timestamp(self.next_id),
        };
        self.rows.entry(content_type).or_default().insert(0, record.clone());
        record
    }

    fn is_down(&self) -> bool {
        self.unreachable_after.map_or(false, |limit| self.mutations >= limit)
    }
}

/// Store whose rows live in memory; rows staged by the fake worker become
/// visible only after a number of matching selects
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn with_rows(content_type: ContentType, rows: Vec<LinkRecord>) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            state.next_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
            state.rows.insert(content_type, rows);
        }
        store
    }

    /// Every mutation after the first `after` fails as unreachable
    pub fn unreachable_after(self, after: usize) -> Self {
        self.state.lock().unwrap().unreachable_after = Some(after);
        self
    }

    pub fn failing_select(self, external_id: u64) -> Self {
        self.state.lock().unwrap().failing_selects.insert(external_id);
        self
    }

    pub fn stage(&self, content_type: ContentType, link: NewLink, hidden_for: u32) {
        self.state.lock().unwrap().hidden.push(HiddenRow {
            content_type,
            link,
            remaining: hidden_for,
        });
    }

    pub fn rows(&self, content_type: ContentType) -> Vec<LinkRecord> {
        self.state
            .lock()
            .unwrap()
            .rows
            .get(&content_type)
            .cloned()
            .unwrap_or_default()
    }

    pub fn remove_silently(&self, content_type: ContentType, id: i64) {
        if let Some(rows) = self.state.lock().unwrap().rows.get_mut(&content_type) {
            rows.retain(|r| r.id != id);
        }
    }

    pub fn select_calls(&self) -> usize {
        self.state.lock().unwrap().select_calls
    }
}

#[async_trait]
impl LinkStore for FakeStore {
    fn store_name(&self) -> &str {
        "fake"
    }

    async fn select(&self, content_type: ContentType, filter: &LinkFilter) -> Result<Vec<LinkRecord>, SourceError> {
        let mut state = self.state.lock().unwrap();
        state.select_calls += 1;
        if let Some(id) = filter.external_content_id {
            if state.failing_selects.contains(&id) {
                return Err(SourceError::Timeout { service: "fake-store" });
            }
        }

        let hidden = std::mem::take(&mut state.hidden);
        for mut row in hidden {
            let matches = row.content_type == content_type
                && filter
                    .external_content_id
                    .map_or(true, |id| row.link.external_content_id == Some(id));
            if !matches {
                state.hidden.push(row);
            } else if row.remaining == 0 {
                state.materialize(row.content_type, row.link);
            } else {
                row.remaining -= 1;
                state.hidden.push(row);
            }
        }

        let mut rows: Vec<LinkRecord> = state
            .rows
            .get(&content_type)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|r| {
                filter
                    .external_content_id
                    .map_or(true, |id| r.external_content_id == Some(id))
            })
            .collect();
        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, content_type: ContentType, rows: &[NewLink]) -> Result<Vec<LinkRecord>, SourceError> {
        let mut state = self.state.lock().unwrap();
        if state.is_down() {
            return Err(unreachable());
        }
        state.mutations += 1;
        Ok(rows
            .iter()
            .cloned()
            .map(|link| state.materialize(content_type, link))
            .collect())
    }

    async fn update(&self, content_type: ContentType, id: i64, patch: &LinkPatch) -> Result<(), SourceError> {
        let mut state = self.state.lock().unwrap();
        if state.is_down() {
            return Err(unreachable());
        }
        state.mutations += 1;
        let row = state
            .rows
            .get_mut(&content_type)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| SourceError::NotFound {
                service: "fake-store",
                what: format!("id {}", id),
            })?;
        if let Some(title) = &patch.title {
            row.title = title.clone();
        }
        if let Some(url) = &patch.url {
            row.url = url.clone();
        }
        if let Some(external_id) = patch.external_content_id {
            row.external_content_id = external_id;
        }
        Ok(())
    }

    async fn delete(&self, content_type: ContentType, id: i64) -> Result<(), SourceError> {
        let mut state = self.state.lock().unwrap();
        if state.is_down() {
            return Err(unreachable());
        }
        state.mutations += 1;
        let rows = state.rows.entry(content_type).or_default();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(SourceError::NotFound {
                service: "fake-store",
                what: format!("id {}", id),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMetadata {
    titles: HashMap<u64, String>,
    failing: HashSet<u64>,
    slow: HashMap<u64, Duration>,
    unavailable: bool,
}

impl FakeMetadata {
    pub fn with_title(mut self, id: u64, title: &str) -> Self {
        self.titles.insert(id, title.to_string());
        self
    }

    pub fn failing(mut self, id: u64) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn slow(mut self, id: u64, delay: Duration) -> Self {
        self.slow.insert(id, delay);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn lookup_by_id(&self, id: u64, _content_type: ContentType) -> Result<Option<ContentMetadata>, SourceError> {
        if self.unavailable {
            return Err(SourceError::Unreachable {
                service: "fake-metadata",
                message: "dns failure".to_string(),
            });
        }
        if let Some(delay) = self.slow.get(&id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&id) {
            return Err(SourceError::Status {
                service: "fake-metadata",
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(self.titles.get(&id).map(|title| ContentMetadata {
            title: Some(title.clone()),
            poster_url: Some(format!("https://img.test/{}.jpg", id)),
        }))
    }

    async fn search(&self, query: &str, _content_type: ContentType) -> Result<Vec<SearchHit>, SourceError> {
        let query = query.to_lowercase();
        let mut hits: Vec<SearchHit> = self
            .titles
            .iter()
            .filter(|(_, title)| title.to_lowercase().contains(&query))
            .map(|(id, title)| SearchHit {
                id: *id,
                title: title.clone(),
                release_date: None,
                poster_url: None,
            })
            .collect();
        hits.sort_by_key(|h| h.id);
        Ok(hits)
    }
}

/// How the fake worker answers for one external id
#[derive(Clone)]
pub enum WorkerScript {
    Reply { reply: WorkerReply, hidden_for: u32 },
    Error,
}

fn bad_gateway() -> SourceError {
    SourceError::Status {
        service: "fake-worker",
        status: 502,
        message: "bad gateway".to_string(),
    }
}

/// Worker that optionally writes rows into a [`FakeStore`] as a real worker would
pub struct FakeWorker {
    store: Option<Arc<FakeStore>>,
    scripts: HashMap<u64, WorkerScript>,
    failing_episodes: HashSet<(u64, u32)>,
    resolvable: HashMap<String, Vec<String>>,
    slow_resolve: HashSet<String>,
    calls: Mutex<Vec<ScrapeRequest>>,
}

impl FakeWorker {
    pub fn new() -> Self {
        Self {
            store: None,
            scripts: HashMap::new(),
            failing_episodes: HashSet::new(),
            resolvable: HashMap::new(),
            slow_resolve: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn writing_to(mut self, store: Arc<FakeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replies `{success, count}` for `id`; on success writes `count` rows
    /// that stay invisible for `hidden_for` matching selects
    pub fn reply(mut self, id: u64, success: bool, count: u64, hidden_for: u32) -> Self {
        self.scripts.insert(
            id,
            WorkerScript::Reply {
                reply: WorkerReply { success, count },
                hidden_for,
            },
        );
        self
    }

    pub fn erroring(mut self, id: u64) -> Self {
        self.scripts.insert(id, WorkerScript::Error);
        self
    }

    /// Fails only the given episode of `id`, whatever its script says
    pub fn erroring_episode(mut self, id: u64, episode: u32) -> Self {
        self.failing_episodes.insert((id, episode));
        self
    }

    pub fn resolves(mut self, title: &str, urls: &[&str]) -> Self {
        self.resolvable
            .insert(title.to_string(), urls.iter().map(|u| u.to_string()).collect());
        self
    }

    pub fn slow_resolve(mut self, title: &str) -> Self {
        self.slow_resolve.insert(title.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ScrapeRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScrapeWorker for FakeWorker {
    fn worker_name(&self) -> &str {
        "fake"
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<WorkerReply, SourceError> {
        self.calls.lock().unwrap().push(request.clone());
        let failing_episode = request
            .episode
            .is_some_and(|e| self.failing_episodes.contains(&(request.external_content_id, e)));
        if failing_episode {
            return Err(bad_gateway());
        }
        match self.scripts.get(&request.external_content_id) {
            Some(WorkerScript::Reply { reply, hidden_for }) => {
                if let (true, Some(store)) = (reply.success, &self.store) {
                    for n in 0..reply.count {
                        let url = format!("https://scraped.test/{}/{}", request.external_content_id, n);
                        let (content_type, link) = match (request.season, request.episode) {
                            (Some(s), Some(e)) => (
                                ContentType::Series,
                                NewLink::episode(Some(request.external_content_id), &request.display_title, s, e, url),
                            ),
                            _ => (
                                ContentType::Movie,
                                NewLink::movie(Some(request.external_content_id), &request.display_title, url),
                            ),
                        };
                        store.stage(content_type, link, *hidden_for);
                    }
                }
                Ok(reply.clone())
            }
            Some(WorkerScript::Error) => Err(bad_gateway()),
            None => Ok(WorkerReply::default()),
        }
    }

    async fn resolve(&self, query: &ResolveQuery) -> Result<Vec<ResolvedLink>, SourceError> {
        if self.slow_resolve.contains(&query.title) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(self
            .resolvable
            .get(&query.title)
            .map(|urls| urls.iter().map(|url| ResolvedLink { url: url.clone() }).collect())
            .unwrap_or_default())
    }
}
