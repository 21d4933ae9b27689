use crate::models::{Post, PostQuery};
use crate::services::SearchBackend;
use async_trait::async_trait;
use elasticsearch::{
    http::transport::{BuildError, SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    Elasticsearch, IndexParts, SearchParts,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid Elasticsearch URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build transport: {0}")]
    TransportBuild(#[from] BuildError),
    #[error("transport error: {0}")]
    Transport(#[from] elasticsearch::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{operation} on index '{index}' returned status {status}: {body}")]
    Status {
        operation: &'static str,
        index: String,
        status: u16,
        body: String,
    },
}

#[derive(Clone)]
pub struct ElasticsearchClient {
    client: Elasticsearch,
}

impl ElasticsearchClient {
    pub fn new(url: &str) -> Result<Self, SearchError> {
        let parsed = Url::parse(url)?;
        let pool = SingleNodeConnectionPool::new(parsed);
        let transport = TransportBuilder::new(pool).build()?;
        let client = Elasticsearch::new(transport);

        Ok(Self { client })
    }

    async fn status_error(
        operation: &'static str,
        index: &str,
        response: elasticsearch::http::response::Response,
    ) -> SearchError {
        let status = response.status_code().as_u16();
        let body = response.text().await.unwrap_or_default();
        SearchError::Status {
            operation,
            index: index.to_string(),
            status,
            body,
        }
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(Self::status_error("exists", index, response).await),
        }
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body.clone())
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(Self::status_error("create", index, response).await);
        }

        Ok(())
    }

    async fn index_post(&self, index: &str, id: &str, post: &Post) -> Result<(), SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(post)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(Self::status_error("index", index, response).await);
        }

        Ok(())
    }

    async fn search_posts(
        &self,
        index: &str,
        query: &PostQuery,
        size: i64,
    ) -> Result<Vec<Post>, SearchError> {
        let body = json!({
            "size": size,
            "query": query.to_dsl()
        });
        debug!(index = %index, body = %body, "Searching posts");

        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(Self::status_error("search", index, response).await);
        }

        let search_response: SearchResponse = response.json().await?;
        let docs = search_response
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| hit.source)
            .collect();
        Ok(docs)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: InnerHits,
}

#[derive(Debug, Deserialize)]
struct InnerHits {
    hits: Vec<PostHit>,
}

#[derive(Debug, Deserialize)]
struct PostHit {
    #[serde(rename = "_source")]
    source: Option<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, MediaType};

    #[test]
    fn test_invalid_url_rejected() {
        let result = ElasticsearchClient::new("not a url");
        assert!(matches!(result, Err(SearchError::InvalidUrl(_))));
    }

    #[test]
    fn test_search_response_deserializes_hits() {
        let raw = json!({
            "took": 3,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [
                    {
                        "_id": "a",
                        "_source": {
                            "user": "alice",
                            "message": "hello",
                            "location": { "lat": 37.7, "lon": -122.4 },
                            "url": "https://storage/a",
                            "type": "image",
                            "face": 0.97
                        }
                    },
                    { "_id": "b" }
                ]
            }
        });

        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        let posts: Vec<Post> = parsed
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| hit.source)
            .collect();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].user, "alice");
        assert_eq!(posts[0].media_type, MediaType::Image);
        assert_eq!(
            posts[0].location,
            Location {
                lat: 37.7,
                lon: -122.4
            }
        );
        assert!((posts[0].face_score - 0.97).abs() < f32::EPSILON);
    }
}
