//! Google Cloud Vision API integration for face detection
use crate::services::gcp_credentials::GcpCredentials;
use crate::services::ImageAnnotator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

const VISION_API_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-vision"];

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("failed to obtain GCP access token: {0}")]
    Auth(#[from] gcp_auth::Error),
    #[error("Vision API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Vision API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("Vision API error {code}: {message}")]
    Api { code: i32, message: String },
}

/// Authentication mode for Vision API
#[derive(Clone)]
pub enum AuthMode {
    /// Use API key authentication
    ApiKey(String),
    /// Use Application Default Credentials
    Adc(GcpCredentials),
}

// The key never reaches the logs.
impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            AuthMode::Adc(_) => f.write_str("Adc"),
        }
    }
}

/// Google Cloud Vision API client
#[derive(Clone)]
pub struct GoogleVisionClient {
    client: Client,
    endpoint: String,
    auth_mode: AuthMode,
}

// ============================================
// Request types
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VisionRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: Image,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Image {
    source: ImageSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageSource {
    /// GCS URI (gs://bucket/object)
    image_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
    max_results: i32,
}

// ============================================
// Response types
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AnnotateImageResponse {
    face_annotations: Option<Vec<FaceAnnotation>>,
    error: Option<VisionError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceAnnotation {
    #[serde(default)]
    detection_confidence: f32,
}

#[derive(Debug, Deserialize)]
struct VisionError {
    code: i32,
    message: String,
}

impl AnnotateImageResponse {
    /// Confidence of the first detected face, 0 when no face was found
    fn face_confidence(self) -> Result<f32, AnnotationError> {
        if let Some(error) = self.error {
            return Err(AnnotationError::Api {
                code: error.code,
                message: error.message,
            });
        }

        Ok(self
            .face_annotations
            .unwrap_or_default()
            .first()
            .map(|face| face.detection_confidence)
            .unwrap_or(0.0))
    }
}

impl GoogleVisionClient {
    /// Create a new Google Vision API client with specified auth mode
    pub fn new(
        endpoint: &str,
        auth_mode: AuthMode,
        timeout: Duration,
    ) -> Result<Self, AnnotationError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            auth_mode,
        })
    }

    /// Get the current auth mode
    pub fn auth_mode(&self) -> &AuthMode {
        &self.auth_mode
    }

    fn face_detection_request(image_uri: &str) -> VisionRequest {
        VisionRequest {
            requests: vec![AnnotateImageRequest {
                image: Image {
                    source: ImageSource {
                        image_uri: image_uri.to_string(),
                    },
                },
                features: vec![Feature {
                    feature_type: "FACE_DETECTION".to_string(),
                    max_results: 1,
                }],
            }],
        }
    }
}

#[async_trait]
impl ImageAnnotator for GoogleVisionClient {
    async fn face_confidence(&self, image_uri: &str) -> Result<f32, AnnotationError> {
        info!(image_uri = %image_uri, "Detecting faces with Google Vision");

        let request = Self::face_detection_request(image_uri);
        let start = std::time::Instant::now();

        let response = match &self.auth_mode {
            AuthMode::ApiKey(api_key) => {
                self.client
                    .post(self.endpoint.as_str())
                    .query(&[("key", api_key)])
                    .json(&request)
                    .send()
                    .await?
            }
            AuthMode::Adc(credentials) => {
                let token = credentials.access_token(VISION_API_SCOPES).await?;
                self.client
                    .post(self.endpoint.as_str())
                    .bearer_auth(&token)
                    .json(&request)
                    .send()
                    .await?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "Vision API request failed");
            return Err(AnnotationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let vision_response: VisionResponse = response.json().await?;
        debug!(
            elapsed_ms = start.elapsed().as_millis(),
            "Vision API response received"
        );

        let score = vision_response
            .responses
            .into_iter()
            .next()
            .unwrap_or_default()
            .face_confidence()?;

        info!(image_uri = %image_uri, score, "Face detection complete");
        Ok(score)
    }
}
