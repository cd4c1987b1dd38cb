// Article composition and editing. Every route here sits behind the session
// middleware; the GET variants return the data the form layer renders from.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{ArticleDraft, ContentService};
use crate::AppState;

/// GET /articles/new - taxonomy options for the compose form
pub async fn new_form(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let service = ContentService::new(state.pool.clone());
    let options = service.form_options().await?;

    Ok(Json(json!({ "success": true, "data": { "options": options } })))
}

/// POST /articles/new - create an article from the submitted draft
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(draft): Json<ArticleDraft>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let service = ContentService::new(state.pool.clone());
    let article = service.add_article(&auth, &draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Article successfully added",
            "data": article,
        })),
    ))
}

/// GET /articles/:id/edit - the article under edit, the taxonomy options,
/// and the title-sorted catalog listing shown alongside the edit form
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let service = ContentService::new(state.pool.clone());
    let article = service.get_article(&id).await?;
    let articles = service.list_articles_by_title().await?;
    let options = service.form_options().await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "article": article,
            "articles": articles,
            "options": options,
        }
    })))
}

/// POST /articles/:id/edit - full replace of the article's editable fields
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(draft): Json<ArticleDraft>,
) -> Result<Json<Value>, ApiError> {
    let service = ContentService::new(state.pool.clone());
    service.edit_article(&auth, &id, &draft).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Article successfully updated",
    })))
}
