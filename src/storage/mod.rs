//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - users(id, email, name, created_at, updated_at)
//! - posts(id, title, content, published, author_id, created_at, updated_at)
//!
//! Every read re-queries the database; nothing is cached in process.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, StoreStats};
