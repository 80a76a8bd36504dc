use async_trait::async_trait;
use link_catalog_config::MetadataConfig;
use link_catalog_models::{ContentMetadata, ContentType, SearchHit};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::models::{SearchPage, SearchResult, TmdbDetails};
use crate::error::SourceError;
use crate::traits::MetadataProvider;

const SERVICE: &str = "tmdb";

/// Shortest query worth sending to the search endpoint
const MIN_QUERY_LEN: usize = 2;

/// [`MetadataProvider`] for The Movie Database v3 API
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(client: Client, config: &MetadataConfig, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn poster_url(&self, poster_path: Option<&str>) -> Option<String> {
        poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.image_base_url, p))
    }

    fn to_hit(&self, result: SearchResult) -> Option<SearchHit> {
        let title = result.title.or(result.name)?;
        Some(SearchHit {
            id: result.id,
            title,
            release_date: result.release_date.or(result.first_air_date),
            poster_url: self.poster_url(result.poster_path.as_deref()),
        })
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn provider_name(&self) -> &str {
        "tmdb"
    }

    async fn lookup_by_id(&self, id: u64, content_type: ContentType) -> Result<Option<ContentMetadata>, SourceError> {
        let url = self.url(&format!("/{}/{}", content_type.metadata_kind(), id));
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No {} entry for id {}", content_type.metadata_kind(), id);
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let details: TmdbDetails = response.json().await.map_err(|e| SourceError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        if details.status_code.is_some() {
            warn!("TMDB reported status {:?} for id {}", details.status_code, id);
            return Ok(None);
        }

        Ok(Some(ContentMetadata {
            title: details.display_title(),
            poster_url: self.poster_url(details.poster_path.as_deref()),
        }))
    }

    async fn search(&self, query: &str, content_type: ContentType) -> Result<Vec<SearchHit>, SourceError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}?api_key={}&language={}&query={}&include_adult=false",
            self.url(&format!("/search/{}", content_type.metadata_kind())),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language),
            urlencoding::encode(query),
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?
            .error_for_status()
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?;

        let page: SearchPage = response.json().await.map_err(|e| SourceError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        let hits = page
            .results
            .into_iter()
            .filter(|r| match content_type {
                ContentType::Series => r.media_type.as_deref().map_or(true, |t| t == "tv"),
                ContentType::Movie => true,
            })
            .filter_map(|r| self.to_hit(r))
            .collect::<Vec<_>>();
        debug!("TMDB search '{}' returned {} hit(s)", query, hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::new(Client::new(), &MetadataConfig::default(), "key".to_string())
    }

    #[test]
    fn test_details_prefer_title_then_name() {
        let movie: TmdbDetails = serde_json::from_str(r#"{"title":"The Matrix","poster_path":"/m.jpg"}"#).unwrap();
        assert_eq!(movie.display_title().as_deref(), Some("The Matrix"));

        let show: TmdbDetails = serde_json::from_str(r#"{"name":"Breaking Bad"}"#).unwrap();
        assert_eq!(show.display_title().as_deref(), Some("Breaking Bad"));

        let blank: TmdbDetails = serde_json::from_str(r#"{"title":"  "}"#).unwrap();
        assert_eq!(blank.display_title(), None);
    }

    #[test]
    fn test_poster_url_joins_image_base() {
        let client = client();
        let poster = client.poster_url(Some("/m.jpg")).unwrap();
        assert!(poster.ends_with("/m.jpg"));
        assert!(poster.starts_with("https://"));
        assert_eq!(client.poster_url(Some("")), None);
        assert_eq!(client.poster_url(None), None);
    }

    #[test]
    fn test_search_hit_uses_first_air_date_for_shows() {
        let result: SearchResult =
            serde_json::from_str(r#"{"id":1396,"name":"Breaking Bad","first_air_date":"2008-01-20"}"#).unwrap();
        let hit = client().to_hit(result).unwrap();
        assert_eq!(hit.title, "Breaking Bad");
        assert_eq!(hit.release_date.as_deref(), Some("2008-01-20"));
    }

    #[tokio::test]
    async fn test_short_query_skips_request() {
        let hits = client().search("a", ContentType::Movie).await.unwrap();
        assert!(hits.is_empty());
    }
}
