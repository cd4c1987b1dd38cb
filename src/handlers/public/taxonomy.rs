// Unauthenticated taxonomy browsing.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::parse_kind;
use crate::services::ContentService;
use crate::AppState;

/// GET /:kind - list a taxonomy collection, ascending by value
pub async fn list(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let kind = parse_kind(&kind)?;

    let service = ContentService::new(state.pool.clone());
    let entries = service.list_taxonomy(kind).await?;

    Ok(Json(json!({ "success": true, "data": entries })))
}
