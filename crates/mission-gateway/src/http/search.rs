use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use mission_search::SearchResponse;
use serde::Deserialize;
use tracing::info;

use crate::app::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q=: ranked hits from the activity log and notes.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let results = state.aggregator.search(&query.q).await;
    info!(query_len = query.q.chars().count(), hits = results.len(), "search");
    Json(SearchResponse { results })
}
