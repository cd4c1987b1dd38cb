use axum::{extract::State, response::IntoResponse, routing::get, Router};
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public browsing, search and identity
        .merge(public_routes())
        // Content mutation behind the session middleware
        .merge(session_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::public::{articles, auth, taxonomy};

    Router::new()
        .route("/", get(articles::list))
        .route("/articles", get(articles::list))
        .route("/search", post(articles::search))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/health", get(health))
        // Taxonomy collections: /editors, /authors, /months, /years, /sections.
        // Static siblings above take precedence over the :kind parameter.
        .route("/:kind", get(taxonomy::list))
}

fn session_routes(state: AppState) -> Router<AppState> {
    use handlers::session::{articles, profile, taxonomy};

    Router::new()
        .route("/profile/:username", get(profile::show))
        .route("/articles/new", get(articles::new_form).post(articles::create))
        .route(
            "/articles/:id/edit",
            get(articles::edit_form).post(articles::update),
        )
        .route("/:kind/new", get(taxonomy::new_form).post(taxonomy::create))
        .route(
            "/:kind/:id/edit",
            get(taxonomy::edit_form).post(taxonomy::update),
        )
        .route("/:kind/:id/delete", get(taxonomy::delete))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::session_auth_middleware,
        ))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match store::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "content store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
