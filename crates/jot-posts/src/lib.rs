//! Post model and queries for jot.
//!
//! A post is a short title/text entry. This crate implements the CRUD and
//! substring-search helpers over a `rusqlite::Connection`; the `posts` table
//! itself is created by the `jot-db` migrations.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during post operations.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("post not found: {0}")]
    NotFound(i64),
}

/// A stored blog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Internal database ID.
    pub id: i64,
    /// Entry title. Escaped when rendered.
    pub title: String,
    /// Entry body. May contain raw markup; rendered as-is.
    pub text: String,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
}

/// Creates a new post and returns its assigned ID.
pub fn create_post(conn: &Connection, title: &str, text: &str) -> Result<i64, PostError> {
    conn.execute(
        "INSERT INTO posts (title, text) VALUES (?1, ?2)",
        params![title, text],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Retrieves a post by ID.
pub fn get_post(conn: &Connection, id: i64) -> Result<Post, PostError> {
    conn.query_row(
        "SELECT id, title, text, created_at FROM posts WHERE id = ?1",
        [id],
        map_row_to_post,
    )
    .optional()?
    .ok_or(PostError::NotFound(id))
}

/// Lists all posts, newest first.
pub fn list_posts(conn: &Connection) -> Result<Vec<Post>, PostError> {
    let mut stmt =
        conn.prepare("SELECT id, title, text, created_at FROM posts ORDER BY id DESC")?;

    let rows = stmt.query_map([], map_row_to_post)?;
    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

/// Deletes a post by ID.
pub fn delete_post(conn: &Connection, id: i64) -> Result<(), PostError> {
    let count = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
    if count == 0 {
        return Err(PostError::NotFound(id));
    }
    Ok(())
}

/// Searches posts whose title or text contains `query` as a substring,
/// newest first.
///
/// Matching is case-insensitive for ASCII (SQL `LIKE` semantics). `%` and
/// `_` in the query are escaped so they match literally rather than acting
/// as wildcards. An empty query matches every post.
pub fn search_posts(conn: &Connection, query: &str) -> Result<Vec<Post>, PostError> {
    let pattern = format!("%{}%", escape_like(query));
    let mut stmt = conn.prepare(
        "SELECT id, title, text, created_at FROM posts
         WHERE title LIKE ?1 ESCAPE '\\' OR text LIKE ?1 ESCAPE '\\'
         ORDER BY id DESC",
    )?;

    let rows = stmt.query_map([&pattern], map_row_to_post)?;
    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?);
    }
    Ok(posts)
}

/// Escapes `LIKE` metacharacters (`%`, `_`) and the escape character itself.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_row_to_post(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        text: row.get(2)?,
        created_at: row.get(3)?,
    })
}
