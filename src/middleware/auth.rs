use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::auth;
use crate::config;
use crate::error::ApiError;
use crate::store::UserStore;
use crate::AppState;

/// Authenticated identity extracted from the session cookie. Threaded as an
/// explicit value into service calls, never read from ambient state.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
}

/// Session authentication middleware for content-mutating routes. Validates
/// the signed session cookie and re-checks that the bound username still
/// exists in the credential store before the request reaches a handler; a
/// stale session whose user has gone away is treated like no session at all.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_name = &config::config().security.session_cookie;
    let token = jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("Login required"))?;

    let claims = auth::decode_token(&token)
        .map_err(|_| ApiError::unauthorized("Session is invalid or has expired"))?;

    let users = UserStore::new(state.pool.clone());
    let user = match users.find_by_username(&claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::unauthorized("Session is invalid or has expired")),
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}
