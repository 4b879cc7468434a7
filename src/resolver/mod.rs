//! Resolution layer - the query/mutation surface
//!
//! Maps the declarative operation surface onto storage:
//! - Queries: all/one lookups for users and posts (absence is not an error)
//! - Mutations: create/update/delete with explicit partial-update semantics
//! - Relation accessors: a user's posts, a post's author, fetched on demand

pub mod engine;
pub mod input;

pub use engine::Resolver;
pub use input::{FieldSemantics, NewPost, NewUser, PostPatch, UserPatch};
