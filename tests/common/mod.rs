#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use masthead::{app, AppState};

/// Build the full router over a fresh in-memory store. Each test gets its
/// own store, so suites are isolated and need no running server.
pub async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory store");
    masthead::store::init_schema(&pool).await.expect("schema");

    app(AppState { pool })
}

pub async fn get(app: &Router, path: &str, cookie: Option<&str>) -> Response {
    send(app, "GET", path, None, cookie).await
}

pub async fn post_json(app: &Router, path: &str, body: Value, cookie: Option<&str>) -> Response {
    send(app, "POST", path, Some(body), cookie).await
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    app.clone().oneshot(request).await.expect("response")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// The `name=value` pair of the session cookie a response sets, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(';').next().unwrap_or_default().to_string())
}

/// Register a fresh account and return the session cookie for it.
pub async fn register(app: &Router, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/register",
        json!({ "username": username, "password": password }),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie(&response).expect("session cookie")
}

/// A complete valid article draft; tests override fields as needed.
pub fn article_draft(title: &str, editor: &str) -> Value {
    json!({
        "title": title,
        "author": "Sam Hart",
        "layout": "Feature",
        "page_count": "6",
        "description": "City nights after dark",
        "editor": editor,
        "month": "June",
        "year": "2021",
    })
}
