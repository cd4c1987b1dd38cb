use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::store::User;

/// Claims bound into a session token. `sub` is the case-folded username the
/// session belongs to; nothing else about the user is trusted from the
/// token, the middleware re-reads the user from the credential store.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.session_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user.username.clone(),
            user_id: user.id.clone(),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug)]
pub enum SessionTokenError {
    TokenGeneration(String),
    InvalidToken,
    InvalidSecret,
}

impl std::fmt::Display for SessionTokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionTokenError::TokenGeneration(msg) => {
                write!(f, "session token generation error: {}", msg)
            }
            SessionTokenError::InvalidToken => write!(f, "invalid session token"),
            SessionTokenError::InvalidSecret => write!(f, "invalid session secret"),
        }
    }
}

impl std::error::Error for SessionTokenError {}

/// Sign a new session token for an authenticated user.
pub fn issue_token(user: &User) -> Result<String, SessionTokenError> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return Err(SessionTokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &Claims::new(user), &encoding_key)
        .map_err(|e| SessionTokenError::TokenGeneration(e.to_string()))
}

/// Validate a session token and extract its claims. Expiry is enforced here.
pub fn decode_token(token: &str) -> Result<Claims, SessionTokenError> {
    let secret = &config::config().security.session_secret;

    if secret.is_empty() {
        return Err(SessionTokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|_| SessionTokenError::InvalidToken)?;

    Ok(token_data.claims)
}

/// The session cookie carrying a freshly issued token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((config::config().security.session_cookie.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// A cookie that instructs the client to drop the session. Clearing an
/// absent session is not an error.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(config::config().security.session_cookie.clone())
        .path("/")
        .build()
}
