/// Data models for geo-post-service
///
/// `Post` is the document stored in the post index; its serialized field
/// names (`url`, `type`, `face`) follow the index mapping so documents
/// written by earlier deployments keep deserializing.
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Geographic point, indexed as `geo_point`. A missing coordinate reads as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// Kind of media attached to a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MediaType {
    Image,
    Video,
    #[default]
    Unknown,
}

impl MediaType {
    /// Resolve a media type from a file extension including the leading dot.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            ".jpeg" | ".jpg" | ".gif" | ".png" => MediaType::Image,
            ".mov" | ".mp4" | ".avi" | ".flv" | ".wmv" => MediaType::Video,
            _ => MediaType::Unknown,
        }
    }

    /// Resolve a media type from an uploaded file name.
    pub fn from_filename(filename: &str) -> Self {
        Self::from_extension(file_extension(filename))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Unknown => "unknown",
        }
    }
}

impl From<String> for MediaType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "image" => MediaType::Image,
            "video" => MediaType::Video,
            _ => MediaType::Unknown,
        }
    }
}

/// Extension of the last path segment, dot included; empty when there is none.
fn file_extension(filename: &str) -> &str {
    let name = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    name.rfind('.').map(|idx| &name[idx..]).unwrap_or("")
}

/// A geo-tagged post as stored in the post index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub user: String,
    pub message: String,
    pub location: Location,
    /// Public link of the uploaded media
    #[serde(rename = "url")]
    pub media_url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Face detection confidence, only set for images
    #[serde(rename = "face")]
    pub face_score: f32,
}

impl Post {
    /// A post with no media attached yet.
    pub fn new(user: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
            location,
            media_url: String::new(),
            media_type: MediaType::Unknown,
            face_score: 0.0,
        }
    }
}

/// Account document for the user index. No handler writes these yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub age: i64,
    pub gender: String,
}

/// Queries the handlers run against the post index
#[derive(Debug, Clone, PartialEq)]
pub enum PostQuery {
    /// Posts whose location lies within `distance` of the point
    GeoDistance { center: Location, distance: String },
    /// Posts whose numeric `field` is at least `gte`
    Range { field: String, gte: f64 },
}

impl PostQuery {
    /// Elasticsearch query DSL for this query
    pub fn to_dsl(&self) -> Value {
        match self {
            PostQuery::GeoDistance { center, distance } => json!({
                "geo_distance": {
                    "distance": distance,
                    "location": { "lat": center.lat, "lon": center.lon }
                }
            }),
            PostQuery::Range { field, gte } => {
                let mut bounds = serde_json::Map::new();
                bounds.insert(field.clone(), json!({ "gte": gte }));
                json!({ "range": Value::Object(bounds) })
            }
        }
    }
}
