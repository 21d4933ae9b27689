/// HTTP handlers
///
/// - `POST /post`: submit a post (multipart upload or JSON body)
/// - `GET /search`: posts within a radius of a point
/// - `GET /cluster`: posts whose numeric field is above the threshold
pub mod cluster;
pub mod posts;
pub mod search;

use actix_web::{web, HttpResponse};

pub use cluster::cluster_posts;
pub use posts::create_post;
pub use search::search_posts;

/// Query string as raw pairs. Decoding into pairs never fails on repeated
/// keys, so handlers stay lenient about odd input.
pub(crate) type QueryPairs = web::Query<Vec<(String, String)>>;

/// First value of `key`, matching form decoding when a key repeats.
pub(crate) fn first_param(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.clone())
}

/// Parse a float the lenient way: anything malformed or missing is 0.
pub(crate) fn parse_coordinate(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(0.0)
}

async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_handler))
        .route("/post", web::post().to(create_post))
        .route("/search", web::get().to(search_posts))
        .route("/cluster", web::get().to(cluster_posts));
}
