use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use link_catalog_models::ContentType;
use link_catalog_sources::{LinkFilter, LinkStore};
use tracing::{debug, info, warn};

/// Waits for rows written asynchronously by the scrape worker to become
/// readable.
///
/// Attempts are counted for the whole batch, not per id.
#[derive(Clone)]
pub struct ReconciliationPoller {
    store: Arc<dyn LinkStore>,
    max_attempts: u32,
    delay: Duration,
}

impl ReconciliationPoller {
    pub fn new(store: Arc<dyn LinkStore>, max_attempts: u32, delay: Duration) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the ids that still had no visible row after the last attempt.
    ///
    /// A leftover id means "not visible yet", not "failed".
    pub async fn poll(&self, content_type: ContentType, ids: &BTreeSet<u64>) -> BTreeSet<u64> {
        let mut pending = ids.clone();

        for attempt in 1..=self.max_attempts {
            if pending.is_empty() {
                break;
            }

            let mut visible = Vec::new();
            for &id in &pending {
                match self.store.select(content_type, &LinkFilter::first_for(id)).await {
                    Ok(rows) if !rows.is_empty() => visible.push(id),
                    Ok(_) => {}
                    Err(e) => warn!("Visibility check for {} {} failed: {}", content_type, id, e),
                }
            }
            for id in visible {
                pending.remove(&id);
            }
            debug!(
                "Reconcile attempt {}/{}: {} of {} id(s) still pending",
                attempt,
                self.max_attempts,
                pending.len(),
                ids.len()
            );

            if !pending.is_empty() && attempt < self.max_attempts {
                tokio::time::sleep(self.delay).await;
            }
        }

        if !pending.is_empty() {
            info!(
                "{} {} id(s) not visible after {} attempt(s); refresh later",
                pending.len(),
                content_type,
                self.max_attempts
            );
        }
        pending
    }
}
