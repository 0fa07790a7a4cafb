//! Free-text title search

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::sources::search::SearchHit;
use crate::AppState;

/// Query parameters for title search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /search?q=TEXT
///
/// Zero hits is a 404, an unreachable search provider a 502.
pub async fn search_titles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    let text = query.q.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Missing search text".to_string()));
    }

    let hits = state.search.search(text).await?;
    info!(query = %text, hits = hits.len(), "Search served");
    Ok(Json(hits))
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/search", get(search_titles))
}
