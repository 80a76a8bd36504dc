use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single unit of work for the scrape worker.
///
/// Movies carry no season/episode; series requests carry both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub external_content_id: u64,
    pub display_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl ScrapeRequest {
    pub fn movie(external_content_id: u64, display_title: impl Into<String>) -> Self {
        Self {
            external_content_id,
            display_title: display_title.into(),
            season: None,
            episode: None,
        }
    }

    pub fn episode(external_content_id: u64, display_title: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            external_content_id,
            display_title: display_title.into(),
            season: Some(season),
            episode: Some(episode),
        }
    }

    /// Short label for logs, e.g. "The Matrix (603)" or "Breaking Bad (1396) S1E2"
    pub fn label(&self) -> String {
        match (self.season, self.episode) {
            (Some(s), Some(e)) => format!("{} ({}) S{}E{}", self.display_title, self.external_content_id, s, e),
            _ => format!("{} ({})", self.display_title, self.external_content_id),
        }
    }
}

/// Lifecycle of one dispatched item.
///
/// `Pending -> Requested -> Succeeded | Failed`, then succeeded items move to
/// `Visible` or `TimedOut` once reconciliation finishes. `TimedOut` only means
/// the rows were not readable yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    Requested,
    Succeeded { links: u64 },
    Failed { reason: String },
    Visible { links: u64 },
    TimedOut { links: u64 },
}

impl ItemState {
    pub fn links(&self) -> u64 {
        match self {
            ItemState::Succeeded { links } | ItemState::Visible { links } | ItemState::TimedOut { links } => *links,
            _ => 0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ItemState::Succeeded { .. } | ItemState::Visible { .. } | ItemState::TimedOut { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeItemReport {
    pub request: ScrapeRequest,
    pub state: ItemState,
}

/// Summary of one dispatch flow
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub attempted: usize,
    pub succeeded_items: usize,
    pub links_found: u64,
    /// Ids with no successful item; partially scraped series are reconciled instead
    pub failed_external_ids: BTreeSet<u64>,
    /// Ids the worker reported success for whose rows were not readable after polling
    pub pending_external_ids: BTreeSet<u64>,
    pub items: Vec<ScrapeItemReport>,
}

impl ScrapeOutcome {
    pub fn summary(&self) -> String {
        format!(
            "Found {} link(s) across {}/{} item(s)",
            self.links_found, self.succeeded_items, self.attempted
        )
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_external_ids.is_empty()
    }
}
