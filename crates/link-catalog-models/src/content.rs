use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of catalog entry a link belongs to.
///
/// Movies and series live in separate collections in the data store and are
/// looked up against different metadata endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    /// Column holding the external content id in the store
    pub fn id_column(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie_id",
            ContentType::Series => "tv_id",
        }
    }

    /// Path segment used by the metadata provider ("movie" / "tv")
    pub fn metadata_kind(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "tv",
        }
    }

    pub fn default_table(&self) -> &'static str {
        match self {
            ContentType::Movie => "download_links",
            ContentType::Series => "series_links",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(ContentType::Movie),
            "series" | "tv" | "show" | "shows" => Ok(ContentType::Series),
            other => Err(format!("Unknown content type: {} (use 'movies' or 'series')", other)),
        }
    }
}
