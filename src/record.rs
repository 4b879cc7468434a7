//! Record types - the typed contract between the resolution layer and callers
//!
//! Two related records:
//! - `User`: owns zero or more posts (logical one-to-many)
//! - `Post`: references its author by id (many-to-one)
//!
//! Records carry scalar fields only. Relations are materialized on demand
//! through the resolver's accessors, never embedded eagerly. Wire names are
//! camelCase (`createdAt`, `authorId`).

use serde::{Deserialize, Serialize};

/// A user record.
///
/// `id` and `created_at` are immutable after creation; `updated_at` is
/// refreshed on every mutation touching the row. Both timestamps are
/// ISO-8601 UTC strings assigned by the resolution layer, never by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Storage-assigned identifier
    pub id: i64,
    /// Contact address; intended unique but not currently enforced
    pub email: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Storage-assigned identifier
    pub id: i64,
    pub title: String,
    /// Body text; NULL-able at any time
    pub content: Option<String>,
    /// Defaults to false at creation; stored as 0/1 and surfaced as a real
    /// boolean at the storage boundary
    pub published: bool,
    /// Owning user id; immutable through the mutation surface
    pub author_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_names_are_camel_case() {
        let user = User {
            id: 1,
            email: "a@x.com".into(),
            name: "A".into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: "2024-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_post_wire_names_are_camel_case() {
        let post = Post {
            id: 1,
            title: "T".into(),
            content: None,
            published: false,
            author_id: 7,
            created_at: "2024-01-01T00:00:00.000Z".into(),
            updated_at: "2024-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["authorId"], 7);
        assert_eq!(json["published"], false);
        assert!(json["content"].is_null());
    }
}
