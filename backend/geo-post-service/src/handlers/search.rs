/// Geo-radius search over indexed posts
use actix_web::{web, HttpResponse};
use tracing::info;

use crate::error::{AppError, Result};
use crate::handlers::{first_param, parse_coordinate, QueryPairs};
use crate::models::{Location, PostQuery};
use crate::AppState;

/// Unit appended to a caller-supplied range
const RANGE_UNIT: &str = "km";

#[derive(Debug, Default)]
pub struct SearchParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub range: Option<String>,
}

impl SearchParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            lat: first_param(pairs, "lat"),
            lon: first_param(pairs, "lon"),
            range: first_param(pairs, "range"),
        }
    }
}

/// Build the geo-distance query for a search request. A non-empty `range`
/// is taken as kilometres; otherwise `default_range` applies.
pub fn geo_query(params: &SearchParams, default_range: &str) -> PostQuery {
    let center = Location {
        lat: parse_coordinate(params.lat.as_deref()),
        lon: parse_coordinate(params.lon.as_deref()),
    };
    let distance = match params.range.as_deref() {
        Some(range) if !range.is_empty() => format!("{range}{RANGE_UNIT}"),
        _ => default_range.to_string(),
    };

    PostQuery::GeoDistance { center, distance }
}

/// GET /search?lat=..&lon=..&range=..
pub async fn search_posts(
    state: web::Data<AppState>,
    pairs: QueryPairs,
) -> Result<HttpResponse> {
    info!("Received one request for search");

    let params = SearchParams::from_pairs(&pairs);
    let settings = &state.settings;
    let query = geo_query(&params, &settings.default_search_range);
    if let PostQuery::GeoDistance { distance, .. } = &query {
        info!(range = %distance, "Searching posts by distance");
    }

    let posts = state
        .search
        .search_posts(&settings.post_index, &query, settings.search_result_size)
        .await
        .map_err(AppError::Search)?;

    info!(hits = posts.len(), "Search completed");
    Ok(HttpResponse::Ok().json(posts))
}

#[cfg(test)]
mod query_tests {
    use super::*;

    fn params(lat: &str, lon: &str, range: Option<&str>) -> SearchParams {
        SearchParams {
            lat: Some(lat.to_string()),
            lon: Some(lon.to_string()),
            range: range.map(str::to_string),
        }
    }

    #[test]
    fn test_geo_query_uses_default_range() {
        let query = geo_query(&params("37.7", "-122.4", None), "200km");
        assert_eq!(
            query,
            PostQuery::GeoDistance {
                center: Location {
                    lat: 37.7,
                    lon: -122.4
                },
                distance: "200km".into(),
            }
        );

        let query = geo_query(&params("37.7", "-122.4", Some("")), "200km");
        assert!(matches!(query, PostQuery::GeoDistance { distance, .. } if distance == "200km"));
    }

    #[test]
    fn test_geo_query_appends_unit_to_range() {
        for range in ["5", "12.5", "1000"] {
            let query = geo_query(&params("1", "2", Some(range)), "200km");
            let expected = format!("{range}km");
            assert!(matches!(query, PostQuery::GeoDistance { distance, .. } if distance == expected));
        }
    }

    #[test]
    fn test_geo_query_zeroes_malformed_coordinates() {
        let query = geo_query(&params("north", "", None), "200km");
        assert!(matches!(
            query,
            PostQuery::GeoDistance { center, .. } if center == Location::default()
        ));
    }
}
