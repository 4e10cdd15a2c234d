//! Login and logout handlers.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{pages, session, AppState};

/// Form body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /login
pub async fn login_form_handler() -> Html<String> {
    Html(pages::login_page(None))
}

/// POST /login
///
/// Credentials are checked against the configured pair. Failures re-render
/// the form with the error inline; success marks the session logged in,
/// queues a flash message, and redirects to the index.
pub async fn login_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.username != state.auth.username {
        tracing::debug!("login rejected: unknown username");
        return Html(pages::login_page(Some("Invalid username"))).into_response();
    }
    if form.password != state.auth.password {
        tracing::debug!("login rejected: wrong password");
        return Html(pages::login_page(Some("Invalid password"))).into_response();
    }

    let token = resolve_session(&state, &headers);
    state.sessions.log_in(&token);
    state.sessions.flash(&token, "You were logged in");
    tracing::info!("user logged in");

    (
        [(SET_COOKIE, session::set_cookie_value(&token))],
        Redirect::to("/"),
    )
        .into_response()
}

/// GET /logout
pub async fn logout_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let token = resolve_session(&state, &headers);
    state.sessions.log_out(&token);
    state.sessions.flash(&token, "You were logged out");
    tracing::info!("user logged out");

    (
        [(SET_COOKIE, session::set_cookie_value(&token))],
        Redirect::to("/"),
    )
        .into_response()
}

/// Reuses the request's live session if it has one, otherwise creates a
/// fresh session.
fn resolve_session(state: &AppState, headers: &HeaderMap) -> String {
    session::token_from_headers(headers)
        .filter(|token| state.sessions.exists(token))
        .unwrap_or_else(|| state.sessions.create())
}
