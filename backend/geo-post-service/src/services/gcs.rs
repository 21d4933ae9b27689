//! GCS client for media uploads
//!
//! Talks to the GCS JSON API: verifies the bucket, uploads the object,
//! grants `allUsers` read access and returns the object's media link.

use crate::services::gcp_credentials::GcpCredentials;
use crate::services::{ObjectStore, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const STORAGE_SCOPES: &[&str] = &["https://www.googleapis.com/auth/devstorage.full_control"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to obtain GCP access token: {0}")]
    Auth(#[from] gcp_auth::Error),
    #[error("GCS request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GCS {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("GCS object {0} has no media link")]
    MissingMediaLink(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    media_link: Option<String>,
}

/// GCS client bound to a single bucket
#[derive(Clone)]
pub struct GcsClient {
    http_client: Client,
    credentials: GcpCredentials,
    endpoint: String,
    bucket: String,
}

impl GcsClient {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        credentials: GcpCredentials,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        info!(bucket = %bucket, "GCS client initialized");

        Ok(Self {
            http_client,
            credentials,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        })
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `gs://` URI of an object in this bucket
    pub fn gs_uri(&self, object_name: &str) -> String {
        format!("gs://{}/{}", self.bucket, object_name)
    }

    fn bucket_url(&self) -> String {
        format!(
            "{}/storage/v1/b/{}",
            self.endpoint,
            urlencoding::encode(&self.bucket)
        )
    }

    fn object_url(&self, object_name: &str) -> String {
        format!("{}/o/{}", self.bucket_url(), urlencoding::encode(object_name))
    }

    fn upload_url(&self, object_name: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoint,
            urlencoding::encode(&self.bucket),
            urlencoding::encode(object_name)
        )
    }

    async fn ensure_success(
        operation: &'static str,
        response: Response,
    ) -> Result<Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Status {
            operation,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn upload(
        &self,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let token = self.credentials.access_token(STORAGE_SCOPES).await?;

        let response = self
            .http_client
            .get(self.bucket_url())
            .bearer_auth(&token)
            .send()
            .await?;
        Self::ensure_success("bucket lookup", response).await?;

        let size = data.len();
        debug!(object = %object_name, size, "Uploading to GCS");
        let response = self
            .http_client
            .post(self.upload_url(object_name))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        Self::ensure_success("upload", response).await?;

        let response = self
            .http_client
            .post(format!("{}/acl", self.object_url(object_name)))
            .bearer_auth(&token)
            .json(&json!({ "entity": "allUsers", "role": "READER" }))
            .send()
            .await?;
        Self::ensure_success("acl update", response).await?;

        let response = self
            .http_client
            .get(self.object_url(object_name))
            .bearer_auth(&token)
            .send()
            .await?;
        let object: ObjectResource = Self::ensure_success("object lookup", response)
            .await?
            .json()
            .await?;

        let media_link = object
            .media_link
            .ok_or_else(|| StorageError::MissingMediaLink(object_name.to_string()))?;

        info!(object = %object_name, size, media_link = %media_link, "Media saved to GCS");

        Ok(StoredObject {
            media_link,
            gs_uri: self.gs_uri(object_name),
        })
    }
}
