use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A persisted download link as read back from the data store.
///
/// Movie rows carry `movie_id`, series rows carry `tv_id` plus season/episode
/// numbers; both are read into the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: i64,
    #[serde(default, alias = "movie_id", alias = "tv_id")]
    pub external_content_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// `title` and `url` are nullable columns written by the worker
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl LinkRecord {
    /// Title to show when no metadata is available for the record
    pub fn fallback_title(&self) -> &str {
        let title = self
            .series_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title);
        if title.trim().is_empty() {
            "Unknown"
        } else {
            title
        }
    }
}

/// A link to be inserted. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewLink {
    pub external_content_id: Option<u64>,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

impl NewLink {
    pub fn movie(external_content_id: Option<u64>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            external_content_id,
            title: title.into(),
            url: url.into(),
            series_title: None,
            season_number: None,
            episode_number: None,
        }
    }

    /// Series links are titled "{series} S{season}E{episode}"
    pub fn episode(
        external_content_id: Option<u64>,
        series_title: impl Into<String>,
        season: u32,
        episode: u32,
        url: impl Into<String>,
    ) -> Self {
        let series_title = series_title.into();
        Self {
            external_content_id,
            title: format!("{} S{}E{}", series_title, season, episode),
            url: url.into(),
            series_title: Some(series_title),
            season_number: Some(season),
            episode_number: Some(episode),
        }
    }
}
