mod client;

pub use client::WorkerClient;

use serde::{Deserialize, Serialize};

/// Tally the worker sends back for one scrape request.
///
/// Missing fields default to an unsuccessful, empty reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkerReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: u64,
}

impl WorkerReply {
    /// Parses a raw reply body. Empty bodies read as `{}`; anything that is
    /// not a JSON object reads as an unsuccessful reply.
    pub fn parse_lenient(body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            return Self::default();
        }
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Links credited to the item; unsuccessful replies count as zero
    pub fn credited_links(&self) -> u64 {
        if self.success {
            self.count
        } else {
            0
        }
    }
}

/// Lookup sent to the worker's resolve endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQuery {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl ResolveQuery {
    pub fn movie(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            season: None,
            episode: None,
        }
    }

    pub fn episode(title: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            title: title.into(),
            season: Some(season),
            episode: Some(episode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedLink {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResolveReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub links: Vec<ResolvedLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_unsuccessful() {
        let reply = WorkerReply::parse_lenient("");
        assert!(!reply.success);
        assert_eq!(reply.count, 0);
    }

    #[test]
    fn test_garbage_body_is_unsuccessful() {
        let reply = WorkerReply::parse_lenient("<html>502 Bad Gateway</html>");
        assert_eq!(reply, WorkerReply::default());
    }

    #[test]
    fn test_count_only_credited_on_success() {
        let reply = WorkerReply::parse_lenient(r#"{"success":false,"count":4}"#);
        assert_eq!(reply.credited_links(), 0);

        let reply = WorkerReply::parse_lenient(r#"{"success":true,"count":3,"extra":"ignored"}"#);
        assert_eq!(reply.credited_links(), 3);
    }

    #[test]
    fn test_resolve_query_omits_missing_episode() {
        let body = serde_json::to_value(ResolveQuery::movie("The Matrix")).unwrap();
        assert_eq!(body, serde_json::json!({ "title": "The Matrix" }));
    }
}
