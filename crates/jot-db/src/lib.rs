//! Database layer for jot.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. Every table in jot is created through the
//! versioned migrations managed by this crate.
//!
//! SQLite was chosen because jot is a single-user, single-process
//! application: a file-based database with WAL mode (concurrent readers,
//! one writer) covers the whole access pattern without an external database
//! process. Migrations are compiled into the binary via `include_str!` so
//! the schema ships with the code that depends on it.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
