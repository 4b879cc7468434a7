//! # Microblog - Typed query/mutation API over users and posts
//!
//! Microblog provides:
//! - Two related record types (User, Post) persisted in SQLite
//! - A resolution layer translating typed operations into parameterized SQL
//! - Partial updates that distinguish omitted, empty, and null fields
//! - Cascading user deletion inside a single transaction
//! - On-demand relation lookup (a user's posts, a post's author)

pub mod config;
pub mod record;
pub mod resolver;
pub mod server;
pub mod storage;

// Re-exports for convenient access
pub use record::{Post, User};
pub use resolver::Resolver;
pub use storage::SqliteStore;

/// Result type alias for microblog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for microblog operations.
///
/// Lookups that match nothing are not errors; they return `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A new post referenced an author id with no matching user
    #[error("Unknown author: no user with id {0}")]
    UnknownAuthor(i64),

    /// Connection failure, constraint violation, or malformed row data
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
