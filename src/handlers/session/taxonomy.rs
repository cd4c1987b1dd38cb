// Taxonomy curation. The add/edit/delete surface is uniform across all
// five kinds; deleting an entry never cascades into articles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::parse_kind;
use crate::middleware::AuthUser;
use crate::services::ContentService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    #[serde(default)]
    pub value: String,
}

/// GET /:kind/new - kind metadata for the add form
pub async fn new_form(Path(kind): Path<String>) -> Result<Json<Value>, ApiError> {
    let kind = parse_kind(&kind)?;

    Ok(Json(json!({
        "success": true,
        "data": { "kind": kind.label() }
    })))
}

/// POST /:kind/new - append a new entry to the collection
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(kind): Path<String>,
    Json(payload): Json<EntryRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let kind = parse_kind(&kind)?;

    let service = ContentService::new(state.pool.clone());
    let entry = service.add_taxonomy(&auth, kind, &payload.value).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("New {} added", kind.label()),
            "data": entry,
        })),
    ))
}

/// GET /:kind/:id/edit - fetch an entry for the edit form
pub async fn edit_form(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = parse_kind(&kind)?;

    let service = ContentService::new(state.pool.clone());
    let entry = service.get_taxonomy(kind, &id).await?;

    Ok(Json(json!({ "success": true, "data": entry })))
}

/// POST /:kind/:id/edit - replace an entry's value
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((kind, id)): Path<(String, String)>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<Value>, ApiError> {
    let kind = parse_kind(&kind)?;

    let service = ContentService::new(state.pool.clone());
    service.edit_taxonomy(&auth, kind, &id, &payload.value).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} successfully updated", capitalize(kind.label())),
    })))
}

/// GET /:kind/:id/delete - remove an entry. Articles that copied its value
/// are untouched.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = parse_kind(&kind)?;

    let service = ContentService::new(state.pool.clone());
    service.delete_taxonomy(&auth, kind, &id).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} deleted", capitalize(kind.label())),
    })))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
