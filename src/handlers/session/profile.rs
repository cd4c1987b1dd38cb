use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::store::UserStore;
use crate::AppState;

/// GET /profile/:username - the session user's profile. The identity is
/// re-derived from the credential store, never trusted from the path; the
/// path segment only exists so profile URLs are shareable per user.
pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(_username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let users = UserStore::new(state.pool.clone());
    let user = users.get_by_username(&auth.username).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "username": user.username,
            "member_since": user.created_at,
        }
    })))
}
