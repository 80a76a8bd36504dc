use serde::{Deserialize, Serialize};

/// Partial update of a link. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    /// `Some(None)` clears the external content id
    pub external_content_id: Option<Option<u64>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none() && self.external_content_id.is_none()
    }
}

/// One independent mutation against a single collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Mutation {
    Delete { id: i64 },
    Update { id: i64, patch: LinkPatch },
}

impl Mutation {
    pub fn id(&self) -> i64 {
        match self {
            Mutation::Delete { id } | Mutation::Update { id, .. } => *id,
        }
    }
}

/// Tally of a batch mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkResult {
    pub succeeded: usize,
    pub failed: usize,
    /// Set when the store became unreachable and the rest of the batch was not tried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl BulkResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.aborted.is_none()
    }

    pub fn summary(&self) -> String {
        match &self.aborted {
            Some(reason) => format!(
                "succeeded {}, failed {} (aborted: {})",
                self.succeeded, self.failed, reason
            ),
            None => format!("succeeded {}, failed {}", self.succeeded, self.failed),
        }
    }
}
