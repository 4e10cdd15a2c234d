//! In-memory session store and cookie helpers.
//!
//! Sessions are keyed by a random 128-bit-plus token carried in an
//! `HttpOnly` cookie. Each session holds the login flag and a queue of
//! flash messages that are drained the next time a page is rendered.
//! Sessions live in process memory only; restarting the server logs
//! everyone out, which is acceptable for a single-user application.
//!
//! The store is bounded: once it crosses `MAX_SESSIONS`, anonymous
//! sessions are swept out so cookieless request churn cannot grow the map
//! without limit. Logged-in sessions always survive a sweep.

use axum::http::HeaderMap;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jot_session";

/// Store size at which anonymous sessions are evicted.
const MAX_SESSIONS: usize = 10_000;

/// Per-session server-side state.
#[derive(Debug, Clone, Default)]
struct Session {
    logged_in: bool,
    flashes: Vec<String>,
}

/// Shared in-memory session store.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    state: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new anonymous session and returns its token.
    pub fn create(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let mut state = self.lock();
        // Every cookieless /login or /logout request mints a session, so
        // sweep anonymous ones out when the map gets large. Worst case an
        // evicted session loses a pending flash message.
        if state.len() >= MAX_SESSIONS {
            state.retain(|_, s| s.logged_in);
            tracing::debug!(remaining = state.len(), "evicted anonymous sessions");
        }
        state.insert(token.clone(), Session::default());
        token
    }

    /// Returns true if the token refers to a live session.
    pub fn exists(&self, token: &str) -> bool {
        self.lock().contains_key(token)
    }

    /// Returns true if the token refers to a logged-in session.
    pub fn is_logged_in(&self, token: &str) -> bool {
        self.lock().get(token).is_some_and(|s| s.logged_in)
    }

    /// Marks the session as logged in. Unknown tokens are ignored.
    pub fn log_in(&self, token: &str) {
        if let Some(session) = self.lock().get_mut(token) {
            session.logged_in = true;
        }
    }

    /// Clears the login flag. Unknown tokens are ignored.
    pub fn log_out(&self, token: &str) {
        if let Some(session) = self.lock().get_mut(token) {
            session.logged_in = false;
        }
    }

    /// Queues a flash message for the next rendered page.
    pub fn flash(&self, token: &str, message: &str) {
        if let Some(session) = self.lock().get_mut(token) {
            session.flashes.push(message.to_string());
        }
    }

    /// Drains and returns all pending flash messages for the session.
    pub fn take_flashes(&self, token: &str) -> Vec<String> {
        self.lock()
            .get_mut(token)
            .map(|s| std::mem::take(&mut s.flashes))
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // Lock poisoned by a panicked thread. Recover with the
                // poisoned guard; the worst case is a stale session entry.
                tracing::error!("session store lock poisoned, recovering with stale state");
                poisoned.into_inner()
            }
        }
    }
}

/// Extracts the session token from a request's `Cookie` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            if name == SESSION_COOKIE {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Builds the `Set-Cookie` value for a session token.
pub fn set_cookie_value(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}
