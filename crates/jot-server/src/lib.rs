//! jot server library logic.
//!
//! Wires the session store, database pool, and configured credentials into
//! an axum router. The binary in `main.rs` handles configuration loading,
//! logging, and graceful shutdown.

pub mod api_auth;
pub mod api_posts;
pub mod config;
pub mod middleware;
pub mod pages;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use jot_db::DbPool;
use serde_json::{json, Value};
use session::SessionStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// In-memory session store.
    pub sessions: SessionStore,
    /// The fixed credential pair accepted at login.
    pub auth: config::AuthConfig,
}

/// Maximum request body size (64 KiB). Form posts are small; anything larger
/// is not a legitimate entry.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/add", post(api_posts::add_handler))
        .route("/delete/{id}", get(api_posts::delete_handler))
        .layer(axum::middleware::from_fn(middleware::auth_middleware));

    Router::new()
        .route("/", get(api_posts::index_handler))
        .route(
            "/login",
            get(api_auth::login_form_handler).post(api_auth::login_handler),
        )
        .route("/logout", get(api_auth::logout_handler))
        .route("/search/", get(api_posts::search_handler))
        .route("/health", get(health))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
