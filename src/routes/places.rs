use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::services::place_search_service::PlaceSearchError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 10;

#[derive(Deserialize)]
pub struct QueryParams {
    query: Option<String>,
    limit: Option<usize>,
}

/*
    /api/places/search?query=...&limit=N
*/
pub async fn search(state: web::Data<AppState>, params: web::Query<QueryParams>) -> impl Responder {
    let query = match params.query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return HttpResponse::Ok().json(json!({ "results": [] })),
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let place_search = match &state.place_search {
        Some(search) => search,
        None => {
            return HttpResponse::ServiceUnavailable()
                .json(json!({ "error": PlaceSearchError::NotConfigured.to_string() }))
        }
    };

    match place_search.search(&query, limit).await {
        Ok(results) => HttpResponse::Ok().json(json!({ "results": results })),
        Err(PlaceSearchError::NotConfigured) => HttpResponse::ServiceUnavailable()
            .json(json!({ "error": PlaceSearchError::NotConfigured.to_string() })),
        Err(err) => {
            error!("Place search failed for \"{}\": {}", query, err);
            HttpResponse::BadGateway().json(json!({ "error": "Failed to fetch places" }))
        }
    }
}
