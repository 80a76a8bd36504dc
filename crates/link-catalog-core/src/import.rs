//! Direct inserts: pasted CSV and worker-resolved links.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use csv::{ReaderBuilder, StringRecord, Trim};
use link_catalog_models::{ContentType, NewLink};
use link_catalog_sources::{LinkStore, ResolveQuery, ScrapeWorker};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{CatalogError, Result};

/// Rows parsed from a CSV paste
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvImport {
    pub rows: Vec<NewLink>,
    pub skipped: usize,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input)
}

fn field<'a>(record: &'a StringRecord, index: usize) -> Option<&'a str> {
    record.get(index).filter(|v| !v.is_empty())
}

/// `Some(None)` for an empty id, `None` when the id is not a number (header lines)
fn optional_id(record: &StringRecord) -> Option<Option<u64>> {
    match field(record, 0) {
        None => Some(None),
        Some(raw) => raw.parse::<u64>().ok().map(Some),
    }
}

fn collect<R: Read>(input: R, parse: impl Fn(&StringRecord) -> Option<NewLink>) -> Result<CsvImport> {
    let mut import = CsvImport::default();
    for record in reader(input).records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        match parse(&record) {
            Some(link) => import.rows.push(link),
            None => {
                debug!("Skipping CSV row {:?}", record);
                import.skipped += 1;
            }
        }
    }
    if import.rows.is_empty() {
        return Err(CatalogError::NoValidRows {
            skipped: import.skipped,
        });
    }
    Ok(import)
}

/// `movieId,title,url`; the id may be empty
pub fn parse_movie_csv<R: Read>(input: R) -> Result<CsvImport> {
    collect(input, |record| {
        let id = optional_id(record)?;
        let title = field(record, 1)?;
        let url = field(record, 2)?;
        Some(NewLink::movie(id, title, url))
    })
}

/// `tvId,seriesTitle,season,episode,url`; the id may be empty
pub fn parse_series_csv<R: Read>(input: R) -> Result<CsvImport> {
    collect(input, |record| {
        let id = optional_id(record)?;
        let series_title = field(record, 1)?;
        let season = field(record, 2)?.parse::<u32>().ok()?;
        let episode = field(record, 3)?.parse::<u32>().ok()?;
        let url = field(record, 4)?;
        Some(NewLink::episode(id, series_title, season, episode, url))
    })
}

/// A catalog item to look up through the worker's resolve endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveTarget {
    pub external_content_id: u64,
    pub title: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    pub inserted: usize,
    /// Titles for which nothing was found
    pub skipped: Vec<String>,
}

/// Resolves a download link per target and inserts the hits in one batch
#[derive(Clone)]
pub struct LinkResolver {
    store: Arc<dyn LinkStore>,
    worker: Arc<dyn ScrapeWorker>,
    timeout: Duration,
}

impl LinkResolver {
    pub fn new(store: Arc<dyn LinkStore>, worker: Arc<dyn ScrapeWorker>, timeout: Duration) -> Self {
        Self { store, worker, timeout }
    }

    async fn first_link(&self, query: &ResolveQuery) -> Option<String> {
        match tokio::time::timeout(self.timeout, self.worker.resolve(query)).await {
            Ok(Ok(links)) => links.into_iter().next().map(|l| l.url),
            Ok(Err(e)) => {
                warn!("Resolve failed for '{}': {}", query.title, e);
                None
            }
            Err(_) => {
                warn!("Resolve for '{}' timed out after {:?}", query.title, self.timeout);
                None
            }
        }
    }

    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn resolve_and_insert(&self, content_type: ContentType, targets: &[ResolveTarget]) -> Result<ResolveReport> {
        if targets.is_empty() {
            return Err(CatalogError::EmptySelection);
        }

        let mut rows = Vec::new();
        let mut report = ResolveReport::default();
        for target in targets {
            let link = match content_type {
                ContentType::Movie => {
                    let url = self.first_link(&ResolveQuery::movie(&target.title)).await;
                    url.map(|url| NewLink::movie(Some(target.external_content_id), &target.title, url))
                }
                ContentType::Series => {
                    let season = target.season.unwrap_or(1);
                    let episode = target.episode.unwrap_or(1);
                    let url = self
                        .first_link(&ResolveQuery::episode(&target.title, season, episode))
                        .await;
                    url.map(|url| NewLink::episode(Some(target.external_content_id), &target.title, season, episode, url))
                }
            };

            match link {
                Some(link) => rows.push(link),
                None => {
                    warn!("No link found for '{}', skipping", target.title);
                    report.skipped.push(target.title.clone());
                }
            }
        }

        if !rows.is_empty() {
            let inserted = self.store.insert(content_type, &rows).await?;
            report.inserted = inserted.len();
        }
        info!(
            "Resolved {} of {} {} item(s)",
            report.inserted,
            targets.len(),
            content_type
        );
        Ok(report)
    }
}
