//! Post listing, creation, deletion, and search handlers.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::middleware::SessionContext;
use crate::{pages, session, AppState};

/// Maximum length for a post title.
const MAX_TITLE_LEN: usize = 256;
/// Maximum length for a post body.
const MAX_TEXT_LEN: usize = 32 * 1024;

/// Form body for `POST /add`.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub title: String,
    pub text: String,
}

/// Query parameters for `GET /search/`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Maps a [`jot_posts::PostError`] to an HTTP status, logging non-404 errors.
fn post_err_to_status(e: jot_posts::PostError) -> StatusCode {
    match e {
        jot_posts::PostError::NotFound(_) => StatusCode::NOT_FOUND,
        ref err => {
            tracing::error!(error = %err, "post operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Pulls the flash queue and login flag for the request's session, if any.
fn session_view(state: &AppState, headers: &HeaderMap) -> (Vec<String>, bool) {
    match session::token_from_headers(headers) {
        Some(token) => (
            state.sessions.take_flashes(&token),
            state.sessions.is_logged_in(&token),
        ),
        None => (Vec::new(), false),
    }
}

/// GET /
pub async fn index_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Html<String>, StatusCode> {
    let (flashes, logged_in) = session_view(&state, &headers);

    let pool = state.pool.clone();
    let posts = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        jot_posts::list_posts(&conn).map_err(post_err_to_status)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)??;

    Ok(Html(pages::posts_page(&posts, &flashes, logged_in)))
}

/// GET /search/?query=...
///
/// A missing `query` parameter is treated as the empty query, which matches
/// every post.
pub async fn search_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, StatusCode> {
    let (flashes, logged_in) = session_view(&state, &headers);
    let query = params.query.unwrap_or_default();

    let pool = state.pool.clone();
    let posts = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        jot_posts::search_posts(&conn, &query).map_err(post_err_to_status)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)??;

    Ok(Html(pages::posts_page(&posts, &flashes, logged_in)))
}

/// POST /add (authenticated)
pub async fn add_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(SessionContext(token)): Extension<SessionContext>,
    Form(form): Form<AddForm>,
) -> Result<Redirect, StatusCode> {
    // Bound field sizes so a single entry cannot balloon the page.
    if form.title.is_empty() || form.title.len() > MAX_TITLE_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }
    if form.text.len() > MAX_TEXT_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }

    let pool = state.pool.clone();
    let id = tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        jot_posts::create_post(&conn, &form.title, &form.text).map_err(post_err_to_status)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)??;

    tracing::info!(post_id = id, "new entry posted");
    state
        .sessions
        .flash(&token, "New entry was successfully posted");

    Ok(Redirect::to("/"))
}

/// GET /delete/{id} (authenticated)
///
/// Reports the outcome as JSON: `status` 1 on success, 0 when the post does
/// not exist (still HTTP 200). Unauthenticated requests never reach this
/// handler; the auth middleware rejects them with 401.
pub async fn delete_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    let pool = state.pool.clone();
    let result = tokio::task::spawn_blocking(move || {
        let conn = pool
            .get()
            .map_err(|e| jot_posts::PostError::Database(rusqlite_unavailable(e)))?;
        jot_posts::delete_post(&conn, id)
    })
    .await;

    match result {
        Ok(Ok(())) => {
            tracing::info!(post_id = id, "entry deleted");
            Json(json!({ "status": 1, "message": "Post Deleted" })).into_response()
        }
        Ok(Err(jot_posts::PostError::NotFound(_))) => {
            Json(json!({ "status": 0, "message": "post not found" })).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, post_id = id, "failed to delete entry");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": 0, "message": "internal server error" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, post_id = id, "delete task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": 0, "message": "internal server error" })),
            )
                .into_response()
        }
    }
}

/// Wraps a pool checkout failure as a rusqlite error so it flows through
/// [`jot_posts::PostError`] like any other database failure.
fn rusqlite_unavailable(e: r2d2::Error) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
        Some(format!("connection pool unavailable: {e}")),
    )
}
