// Unauthenticated catalog browsing and full-text search.

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::ContentService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// GET / and GET /articles - list every article in the catalog
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let service = ContentService::new(state.pool.clone());
    let articles = service.list_articles().await?;

    Ok(Json(json!({ "success": true, "data": articles })))
}

/// POST /search - full-text search over title, author and description.
/// A query with no searchable terms returns the full listing.
pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let service = ContentService::new(state.pool.clone());
    let articles = service.search_articles(&payload.query).await?;

    Ok(Json(json!({ "success": true, "data": articles })))
}
