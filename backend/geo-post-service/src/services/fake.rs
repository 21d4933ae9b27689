//! In-memory implementations of the service traits for tests.
//! Every call is recorded so tests can assert which external calls happened.
use crate::models::{Post, PostQuery};
use crate::services::{
    AnnotationError, ImageAnnotator, ObjectStore, SearchBackend, SearchError, StorageError,
    StoredObject,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

fn unavailable(operation: &'static str, index: &str) -> SearchError {
    SearchError::Status {
        operation,
        index: index.to_string(),
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[derive(Clone, Default)]
pub struct FakeSearch {
    indices: Arc<Mutex<HashSet<String>>>,
    created: Arc<Mutex<Vec<(String, Value)>>>,
    indexed: Arc<Mutex<Vec<(String, String, Post)>>>,
    queries: Arc<Mutex<Vec<(String, PostQuery, i64)>>>,
    results: Arc<Mutex<Vec<Post>>>,
    fail: Arc<Mutex<bool>>,
    fail_create: Arc<Mutex<bool>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indices(indices: &[&str]) -> Self {
        let existing: HashSet<String> = indices.iter().map(|i| i.to_string()).collect();
        Self {
            indices: Arc::new(Mutex::new(existing)),
            ..Self::default()
        }
    }

    /// Posts returned by every search
    pub async fn set_results(&self, posts: Vec<Post>) {
        *self.results.lock().await = posts;
    }

    /// Make every subsequent call fail
    pub async fn fail_all(&self) {
        *self.fail.lock().await = true;
    }

    /// Make only index creation fail; existence checks still answer
    pub async fn fail_creates(&self) {
        *self.fail_create.lock().await = true;
    }

    pub async fn created_indices(&self) -> Vec<(String, Value)> {
        self.created.lock().await.clone()
    }

    pub async fn indexed_posts(&self) -> Vec<(String, String, Post)> {
        self.indexed.lock().await.clone()
    }

    pub async fn queries(&self) -> Vec<(String, PostQuery, i64)> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        if *self.fail.lock().await {
            return Err(unavailable("exists", index));
        }
        Ok(self.indices.lock().await.contains(index))
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchError> {
        if *self.fail.lock().await || *self.fail_create.lock().await {
            return Err(unavailable("create", index));
        }
        self.indices.lock().await.insert(index.to_string());
        self.created
            .lock()
            .await
            .push((index.to_string(), body.clone()));
        Ok(())
    }

    async fn index_post(&self, index: &str, id: &str, post: &Post) -> Result<(), SearchError> {
        if *self.fail.lock().await {
            return Err(unavailable("index", index));
        }
        self.indexed
            .lock()
            .await
            .push((index.to_string(), id.to_string(), post.clone()));
        Ok(())
    }

    async fn search_posts(
        &self,
        index: &str,
        query: &PostQuery,
        size: i64,
    ) -> Result<Vec<Post>, SearchError> {
        self.queries
            .lock()
            .await
            .push((index.to_string(), query.clone(), size));
        if *self.fail.lock().await {
            return Err(unavailable("search", index));
        }
        Ok(self.results.lock().await.clone())
    }
}

#[derive(Clone, Default)]
pub struct FakeStore {
    uploads: Arc<Mutex<Vec<(String, Bytes, String)>>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_uploads(&self) {
        *self.fail.lock().await = true;
    }

    pub async fn uploads(&self) -> Vec<(String, Bytes, String)> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(
        &self,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        if *self.fail.lock().await {
            return Err(StorageError::Status {
                operation: "upload",
                status: 403,
                body: "forbidden".to_string(),
            });
        }
        self.uploads
            .lock()
            .await
            .push((object_name.to_string(), data, content_type.to_string()));
        Ok(StoredObject {
            media_link: format!("https://storage.test/fake-bucket/{object_name}"),
            gs_uri: format!("gs://fake-bucket/{object_name}"),
        })
    }
}

#[derive(Clone, Default)]
pub struct FakeAnnotator {
    score: Arc<Mutex<f32>>,
    calls: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeAnnotator {
    pub fn with_score(score: f32) -> Self {
        Self {
            score: Arc::new(Mutex::new(score)),
            ..Self::default()
        }
    }

    pub async fn fail_annotations(&self) {
        *self.fail.lock().await = true;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ImageAnnotator for FakeAnnotator {
    async fn face_confidence(&self, image_uri: &str) -> Result<f32, AnnotationError> {
        self.calls.lock().await.push(image_uri.to_string());
        if *self.fail.lock().await {
            return Err(AnnotationError::Status {
                status: 500,
                body: "backend error".to_string(),
            });
        }
        Ok(*self.score.lock().await)
    }
}
