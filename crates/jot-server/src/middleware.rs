//! Request middleware: session authentication for mutation routes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{session, AppState};

/// The authenticated session token, inserted into request extensions by
/// [`auth_middleware`] for downstream handlers.
#[derive(Clone, Debug)]
pub struct SessionContext(pub String);

/// Builds the 401 response returned to unauthenticated mutation requests.
pub fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "status": 0,
            "message": "Please log in."
        })),
    )
        .into_response()
}

/// Middleware guarding routes that mutate posts.
///
/// Resolves the session cookie against the store; requests without a
/// logged-in session are rejected with 401 and a JSON body. Valid requests
/// proceed with a [`SessionContext`] in their extensions.
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?
        .clone();

    let token = match session::token_from_headers(req.headers()) {
        Some(token) if state.sessions.is_logged_in(&token) => token,
        _ => return Ok(unauthorized_response()),
    };

    req.extensions_mut().insert(SessionContext(token));
    Ok(next.run(req).await)
}
