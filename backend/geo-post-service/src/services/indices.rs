//! Index bootstrapping for the post and user indices
use crate::services::{SearchBackend, SearchError};
use serde_json::{json, Value};
use tracing::info;

/// Mapping of the post index. Only `location` and `face` are searchable.
pub fn post_index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "user":     { "type": "keyword", "index": false },
                "message":  { "type": "keyword", "index": false },
                "location": { "type": "geo_point" },
                "url":      { "type": "keyword", "index": false },
                "type":     { "type": "keyword", "index": false },
                "face":     { "type": "float" }
            }
        }
    })
}

/// Mapping of the user index, looked up by username
pub fn user_index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "username": { "type": "keyword" },
                "password": { "type": "keyword", "index": false },
                "age":      { "type": "long", "index": false },
                "gender":   { "type": "keyword", "index": false }
            }
        }
    })
}

async fn ensure_index(
    backend: &dyn SearchBackend,
    index: &str,
    mapping: &Value,
) -> Result<bool, SearchError> {
    if backend.index_exists(index).await? {
        info!(index = %index, "Index already exists");
        return Ok(false);
    }

    backend.create_index(index, mapping).await?;
    info!(index = %index, "Index created");
    Ok(true)
}

/// Create the post and user indices when absent. Returns the names of the
/// indices that were created; the first failure aborts the run.
pub async fn ensure_indices(
    backend: &dyn SearchBackend,
    post_index: &str,
    user_index: &str,
) -> Result<Vec<String>, SearchError> {
    let mut created = Vec::new();

    if ensure_index(backend, post_index, &post_index_mapping()).await? {
        created.push(post_index.to_string());
    }
    if ensure_index(backend, user_index, &user_index_mapping()).await? {
        created.push(user_index.to_string());
    }

    Ok(created)
}
