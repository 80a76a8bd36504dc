use async_trait::async_trait;
use link_catalog_config::WorkerConfig;
use link_catalog_models::ScrapeRequest;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, trace};

use super::{ResolveQuery, ResolveReply, ResolvedLink, WorkerReply};
use crate::error::SourceError;
use crate::traits::ScrapeWorker;

const SERVICE: &str = "worker";

/// HTTP client for the external scrape worker
#[derive(Clone)]
pub struct WorkerClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl WorkerClient {
    pub fn new(config: &WorkerConfig, token: Option<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/scrape/{}", self.base_url, path)
    }

    /// POSTs `body` and returns the raw reply text; non-2xx is an error
    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String, SourceError> {
        let mut builder = self.client.post(self.endpoint(path)).json(body);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?;
        trace!("worker {} -> {} {}", path, status, text);

        if !status.is_success() {
            return Err(SourceError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(text)
    }
}

/// Request body for the movie or episode endpoint
pub(crate) fn scrape_body(request: &ScrapeRequest) -> (&'static str, serde_json::Value) {
    match (request.season, request.episode) {
        (Some(season), Some(episode)) => (
            "episode",
            json!({
                "tvId": request.external_content_id,
                "seriesTitle": request.display_title,
                "season": season,
                "episode": episode,
            }),
        ),
        _ => (
            "movie",
            json!({
                "movieId": request.external_content_id,
                "movieTitle": request.display_title,
            }),
        ),
    }
}

#[async_trait]
impl ScrapeWorker for WorkerClient {
    fn worker_name(&self) -> &str {
        "http-worker"
    }

    async fn scrape(&self, request: &ScrapeRequest) -> Result<WorkerReply, SourceError> {
        let (path, body) = scrape_body(request);
        let text = self.post(path, &body).await?;
        let reply = WorkerReply::parse_lenient(&text);
        debug!(
            "Worker replied for {}: success={} count={}",
            request.label(),
            reply.success,
            reply.count
        );
        Ok(reply)
    }

    async fn resolve(&self, query: &ResolveQuery) -> Result<Vec<ResolvedLink>, SourceError> {
        let text = self.post("resolve", query).await?;
        let reply: ResolveReply = if text.trim().is_empty() {
            ResolveReply::default()
        } else {
            serde_json::from_str(&text).unwrap_or_default()
        };
        if !reply.success {
            return Ok(Vec::new());
        }
        Ok(reply.links.into_iter().filter(|l| !l.url.trim().is_empty()).collect())
    }
}
