// Registration, login and logout. Successful registration and login both
// start a session by setting the signed session cookie.

use axum::{extract::State, http::StatusCode, response::Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;
use crate::services::IdentityService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /register - create an account and start a session
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, CookieJar, Json<Value>), ApiError> {
    let identity = IdentityService::new(state.pool.clone());
    let user = identity.register(&payload.username, &payload.password).await?;

    let token = auth::issue_token(&user)?;
    let jar = jar.add(auth::session_cookie(token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "data": {
                "username": user.username,
                "profile": format!("/profile/{}", user.username),
            }
        })),
    ))
}

/// POST /login - verify credentials and start a session. Unknown usernames
/// and wrong passwords produce the same response.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let identity = IdentityService::new(state.pool.clone());
    let user = identity.login(&payload.username, &payload.password).await?;

    let token = auth::issue_token(&user)?;
    let jar = jar.add(auth::session_cookie(token));

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": format!("Welcome, {}", user.username),
            "data": {
                "username": user.username,
                "profile": format!("/profile/{}", user.username),
            }
        })),
    ))
}

/// GET /logout - end the session. Idempotent: logging out without a session
/// still succeeds, there is nothing to invalidate server-side.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(auth::clear_session_cookie());

    (
        jar,
        Json(json!({
            "success": true,
            "message": "You have been logged out",
        })),
    )
}
