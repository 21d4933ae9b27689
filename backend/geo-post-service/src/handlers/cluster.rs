/// Threshold queries over a numeric post field, e.g. `/cluster?term=face`
/// returns the images most likely to contain a face.
use actix_web::{web, HttpResponse};
use tracing::info;

use crate::error::{AppError, Result};
use crate::handlers::{first_param, QueryPairs};
use crate::models::PostQuery;
use crate::AppState;

#[derive(Debug, Default)]
pub struct ClusterParams {
    pub term: String,
}

impl ClusterParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            term: first_param(pairs, "term").unwrap_or_default(),
        }
    }
}

/// GET /cluster?term=<field>
pub async fn cluster_posts(
    state: web::Data<AppState>,
    pairs: QueryPairs,
) -> Result<HttpResponse> {
    let params = ClusterParams::from_pairs(&pairs);
    let settings = &state.settings;
    info!(term = %params.term, "Received one cluster request");

    // The field is passed through as-is; the search engine rejects unknown ones.
    let query = PostQuery::Range {
        field: params.term,
        gte: settings.cluster_threshold,
    };

    let posts = state
        .search
        .search_posts(&settings.post_index, &query, settings.search_result_size)
        .await
        .map_err(AppError::Cluster)?;

    info!(hits = posts.len(), "Cluster query completed");
    Ok(HttpResponse::Ok().json(posts))
}
