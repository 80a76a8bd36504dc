//! Builds the three collaborators from configuration and stored credentials.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use link_catalog_config::{Config, CredentialStore};
use link_catalog_models::{ContentMetadata, ContentType};
use reqwest::Client;
use tracing::{info, warn};

use crate::error::SourceError;
use crate::store::PostgrestStore;
use crate::tmdb::TmdbClient;
use crate::traits::{LinkStore, MetadataProvider, ScrapeWorker};
use crate::worker::WorkerClient;

/// The wired-up collaborators handed to the engine
#[derive(Clone)]
pub struct Sources {
    pub store: Arc<dyn LinkStore>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub worker: Arc<dyn ScrapeWorker>,
}

pub struct SourceFactory;

impl SourceFactory {
    /// Creates the HTTP adapters.
    ///
    /// The store key is required. Without a TMDB key groups keep their stored
    /// titles; without a worker token requests go out unauthenticated.
    pub fn build(config: &Config, credentials: &CredentialStore) -> Result<Sources> {
        let store_key = credentials
            .store_api_key()
            .context("Store API key not set. Run `linkvault config init` or set LINKVAULT_STORE_KEY")?;
        let store = PostgrestStore::new(&config.store, store_key)?;
        info!("Using data store at {}", config.store.url);

        let metadata: Arc<dyn MetadataProvider> = match credentials.tmdb_api_key() {
            Some(key) => {
                let client = Client::builder()
                    .timeout(config.engine.metadata_timeout())
                    .build()
                    .map_err(|e| SourceError::from_reqwest("tmdb", e))?;
                Arc::new(TmdbClient::new(client, &config.metadata, key))
            }
            None => {
                warn!("TMDB API key not set; groups will show stored titles only");
                Arc::new(NoMetadata)
            }
        };

        let token = credentials.worker_token();
        if token.is_none() {
            warn!("Worker token not set; scrape requests will be sent without a bearer token");
        }
        let worker = WorkerClient::new(&config.worker, token)?;

        Ok(Sources {
            store: Arc::new(store),
            metadata,
            worker: Arc::new(worker),
        })
    }
}

/// Provider used when no metadata credentials exist; resolves nothing
struct NoMetadata;

#[async_trait]
impl MetadataProvider for NoMetadata {
    fn provider_name(&self) -> &str {
        "none"
    }

    async fn lookup_by_id(&self, _id: u64, _content_type: ContentType) -> Result<Option<ContentMetadata>, SourceError> {
        Ok(None)
    }
}
