use serde::{Deserialize, Serialize};

/// Display metadata for one external content id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentMetadata {
    /// Provider title; `None` keeps whatever title the group already has
    pub title: Option<String>,
    pub poster_url: Option<String>,
}

/// A metadata provider search result, used to pick ids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
}
