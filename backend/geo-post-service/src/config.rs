//! Configuration for geo-post-service
//!
//! Every endpoint, bucket, index name and query default lives here so the
//! clients and handlers receive them at construction time.
use serde::Deserialize;
use std::time::Duration;

/// Main configuration struct, loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Interface the HTTP server binds to
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Elasticsearch node URL
    #[serde(default = "default_elasticsearch_url")]
    pub elasticsearch_url: String,

    /// Index holding post documents
    #[serde(default = "default_post_index")]
    pub post_index: String,

    /// Index holding user documents (schema only)
    #[serde(default = "default_user_index")]
    pub user_index: String,

    /// GCS bucket that receives uploaded media
    #[serde(default = "default_gcs_bucket")]
    pub gcs_bucket: String,

    /// GCS JSON API base URL (override for emulators)
    #[serde(default = "default_gcs_endpoint")]
    pub gcs_endpoint: String,

    /// Cloud Vision annotate endpoint
    #[serde(default = "default_vision_endpoint")]
    pub vision_endpoint: String,

    /// Cloud Vision API key (optional, uses ADC if not set)
    #[serde(default)]
    pub vision_api_key: Option<String>,

    /// Radius used by /search when the caller sends no range
    #[serde(default = "default_search_range")]
    pub default_search_range: String,

    /// Lower bound applied by /cluster
    #[serde(default = "default_cluster_threshold")]
    pub cluster_threshold: f64,

    /// Number of hits requested from Elasticsearch per query
    #[serde(default = "default_search_result_size")]
    pub search_result_size: i64,

    /// Largest `/post` body accepted, multipart or JSON
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Request timeout for GCS calls, in seconds
    #[serde(default = "default_gcs_timeout_secs")]
    pub gcs_timeout_secs: u64,

    /// Request timeout for Vision API calls, in seconds
    #[serde(default = "default_vision_timeout_secs")]
    pub vision_timeout_secs: u64,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_elasticsearch_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_post_index() -> String {
    "post".to_string()
}

fn default_user_index() -> String {
    "user".to_string()
}

fn default_gcs_bucket() -> String {
    "socialme-bucket".to_string()
}

fn default_gcs_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com/v1/images:annotate".to_string()
}

fn default_search_range() -> String {
    "200km".to_string()
}

fn default_cluster_threshold() -> f64 {
    0.9
}

fn default_search_result_size() -> i64 {
    10_000 // index.max_result_window
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024 // 32MB
}

fn default_gcs_timeout_secs() -> u64 {
    300
}

fn default_vision_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn gcs_timeout(&self) -> Duration {
        Duration::from_secs(self.gcs_timeout_secs)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_secs)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Address the HTTP server binds to
    pub fn http_bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Settings consumed by the request handlers
    pub fn handler_settings(&self) -> HandlerSettings {
        HandlerSettings {
            post_index: self.post_index.clone(),
            default_search_range: self.default_search_range.clone(),
            cluster_threshold: self.cluster_threshold,
            search_result_size: self.search_result_size,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// The slice of configuration the HTTP handlers need
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub post_index: String,
    pub default_search_range: String,
    pub cluster_threshold: f64,
    pub search_result_size: i64,
    pub max_body_bytes: usize,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            post_index: default_post_index(),
            default_search_range: default_search_range(),
            cluster_threshold: default_cluster_threshold(),
            search_result_size: default_search_result_size(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.post_index, "post");
        assert_eq!(config.user_index, "user");
        assert_eq!(config.default_search_range, "200km");
        assert_eq!(config.cluster_threshold, 0.9);
        assert!(config.vision_api_key.is_none());
        assert_eq!(config.http_bind_address(), "0.0.0.0:8080");
        assert_eq!(config.max_body_bytes, 32 * 1024 * 1024);
        assert_eq!(config.gcs_timeout(), Duration::from_secs(300));
        assert_eq!(config.vision_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("HTTP_PORT".to_string(), "9090".to_string()),
            ("GCS_BUCKET".to_string(), "media-test".to_string()),
            ("VISION_API_KEY".to_string(), "key-123".to_string()),
            ("DEFAULT_SEARCH_RANGE".to_string(), "50km".to_string()),
            ("MAX_BODY_BYTES".to_string(), "1024".to_string()),
            ("VISION_TIMEOUT_SECS".to_string(), "5".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.gcs_bucket, "media-test");
        assert_eq!(config.vision_api_key.as_deref(), Some("key-123"));

        let settings = config.handler_settings();
        assert_eq!(settings.default_search_range, "50km");
        assert_eq!(settings.post_index, "post");
        assert_eq!(settings.max_body_bytes, 1024);
        assert_eq!(config.vision_timeout(), Duration::from_secs(5));
    }
}
