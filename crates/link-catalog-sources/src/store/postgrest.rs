use async_trait::async_trait;
use link_catalog_config::StoreConfig;
use link_catalog_models::{ContentType, LinkPatch, LinkRecord, NewLink};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

use super::LinkFilter;
use crate::error::SourceError;
use crate::traits::LinkStore;

const SERVICE: &str = "store";

/// [`LinkStore`] backed by a PostgREST endpoint (e.g. a Supabase project)
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
    movie_table: String,
    series_table: String,
}

impl PostgrestStore {
    pub fn new(config: &StoreConfig, api_key: String) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?;
        Ok(Self::with_client(client, config, api_key))
    }

    pub fn with_client(client: Client, config: &StoreConfig, api_key: String) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key,
            movie_table: config.movie_table.clone(),
            series_table: config.series_table.clone(),
        }
    }

    fn table(&self, content_type: ContentType) -> &str {
        match content_type {
            ContentType::Movie => &self.movie_table,
            ContentType::Series => &self.series_table,
        }
    }

    fn table_url(&self, content_type: ContentType) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table(content_type))
    }

    fn request(&self, method: Method, content_type: ContentType) -> RequestBuilder {
        self.client
            .request(method, self.table_url(content_type))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SourceError> {
        let response = builder
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn rows<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<Vec<T>, SourceError> {
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| SourceError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })
    }

    fn id_filter(id: i64) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }
}

/// Column layout of an insert for the given collection
pub(crate) fn insert_row(content_type: ContentType, link: &NewLink) -> Value {
    match content_type {
        ContentType::Movie => json!({
            "movie_id": link.external_content_id,
            "title": link.title,
            "url": link.url,
        }),
        ContentType::Series => json!({
            "tv_id": link.external_content_id,
            "series_title": link.series_title,
            "season_number": link.season_number,
            "episode_number": link.episode_number,
            "title": link.title,
            "url": link.url,
        }),
    }
}

/// Only the columns the patch touches are sent
pub(crate) fn patch_body(content_type: ContentType, patch: &LinkPatch) -> Value {
    let mut body = Map::new();
    if let Some(title) = &patch.title {
        body.insert("title".to_string(), Value::from(title.clone()));
    }
    if let Some(url) = &patch.url {
        body.insert("url".to_string(), Value::from(url.clone()));
    }
    if let Some(external_id) = patch.external_content_id {
        body.insert(content_type.id_column().to_string(), json!(external_id));
    }
    Value::Object(body)
}

#[async_trait]
impl LinkStore for PostgrestStore {
    fn store_name(&self) -> &str {
        "postgrest"
    }

    async fn select(&self, content_type: ContentType, filter: &LinkFilter) -> Result<Vec<LinkRecord>, SourceError> {
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(id) = filter.external_content_id {
            query.push((content_type.id_column(), format!("eq.{}", id)));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        trace!("Selecting from {} with {:?}", self.table(content_type), query);

        let response = self.send(self.request(Method::GET, content_type).query(&query)).await?;
        self.rows(response).await
    }

    async fn insert(&self, content_type: ContentType, rows: &[NewLink]) -> Result<Vec<LinkRecord>, SourceError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let body: Vec<Value> = rows.iter().map(|r| insert_row(content_type, r)).collect();
        let builder = self
            .request(Method::POST, content_type)
            .header("Prefer", "return=representation")
            .json(&body);

        let response = self.send(builder).await?;
        let inserted: Vec<LinkRecord> = self.rows(response).await?;
        debug!("Inserted {} row(s) into {}", inserted.len(), self.table(content_type));
        Ok(inserted)
    }

    async fn update(&self, content_type: ContentType, id: i64, patch: &LinkPatch) -> Result<(), SourceError> {
        if patch.is_empty() {
            return Err(SourceError::InvalidInput(format!("empty patch for link {}", id)));
        }
        let builder = self
            .request(Method::PATCH, content_type)
            .query(&Self::id_filter(id))
            .header("Prefer", "return=representation")
            .json(&patch_body(content_type, patch));

        let response = self.send(builder).await?;
        let touched: Vec<Value> = self.rows(response).await?;
        if touched.is_empty() {
            return Err(SourceError::NotFound {
                service: SERVICE,
                what: format!("{} id {}", self.table(content_type), id),
            });
        }
        Ok(())
    }

    async fn delete(&self, content_type: ContentType, id: i64) -> Result<(), SourceError> {
        let builder = self
            .request(Method::DELETE, content_type)
            .query(&Self::id_filter(id))
            .header("Prefer", "return=representation");

        let response = self.send(builder).await?;
        let removed: Vec<Value> = self.rows(response).await?;
        if removed.is_empty() {
            return Err(SourceError::NotFound {
                service: SERVICE,
                what: format!("{} id {}", self.table(content_type), id),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_insert_row_uses_movie_columns() {
        let row = insert_row(ContentType::Movie, &NewLink::movie(Some(603), "The Matrix", "https://x/1"));
        assert_eq!(row["movie_id"], 603);
        assert!(row.get("tv_id").is_none());
        assert!(row.get("season_number").is_none());
    }

    #[test]
    fn test_series_insert_row_keeps_null_id() {
        let row = insert_row(ContentType::Series, &NewLink::episode(None, "Show", 2, 5, "https://x/2"));
        assert!(row["tv_id"].is_null());
        assert_eq!(row["season_number"], 2);
        assert_eq!(row["title"], "Show S2E5");
    }

    #[test]
    fn test_patch_body_only_sends_touched_columns() {
        let patch = LinkPatch {
            title: Some("New".into()),
            url: None,
            external_content_id: Some(None),
        };
        let body = patch_body(ContentType::Series, &patch);
        assert_eq!(body["title"], "New");
        assert!(body.get("url").is_none());
        assert!(body["tv_id"].is_null());
        assert!(body.as_object().unwrap().contains_key("tv_id"));
    }
}
