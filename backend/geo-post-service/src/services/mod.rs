/// External service clients
///
/// Each collaborator sits behind a narrow async trait so the handlers can
/// run against the real Google/Elastic clients or against in-memory fakes.
pub mod elasticsearch;
pub mod gcp_credentials;
pub mod gcs;
pub mod indices;
pub mod vision;

#[cfg(test)]
pub mod fake;

use crate::models::{Post, PostQuery};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

pub use self::elasticsearch::{ElasticsearchClient, SearchError};
pub use gcp_credentials::GcpCredentials;
pub use gcs::{GcsClient, StorageError};
pub use indices::{ensure_indices, post_index_mapping, user_index_mapping};
pub use vision::{AnnotationError, AuthMode, GoogleVisionClient};

/// Document search engine holding the post and user indices
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    async fn create_index(&self, index: &str, body: &Value) -> Result<(), SearchError>;

    /// Write a post under a fixed document id
    async fn index_post(&self, index: &str, id: &str, post: &Post) -> Result<(), SearchError>;

    async fn search_posts(
        &self,
        index: &str,
        query: &PostQuery,
        size: i64,
    ) -> Result<Vec<Post>, SearchError>;
}

/// Location of an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Publicly readable download link
    pub media_link: String,
    /// `gs://bucket/object` URI understood by the Vision API
    pub gs_uri: String,
}

/// Object storage for uploaded media
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `data` as `object_name`, make it publicly readable and return its location
    async fn upload(
        &self,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;
}

/// Image annotation service
#[async_trait]
pub trait ImageAnnotator: Send + Sync {
    /// Face detection confidence in [0, 1] for the image at `image_uri`
    async fn face_confidence(&self, image_uri: &str) -> Result<f32, AnnotationError>;
}
