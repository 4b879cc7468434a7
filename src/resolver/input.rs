//! Input types for the mutation surface
//!
//! Creation inputs make required fields unrepresentable-when-missing: a
//! request without them is rejected at deserialization, before any storage
//! call. Patch types carry only the fields the caller explicitly supplied;
//! how a supplied value is applied is governed by `FieldSemantics`.

use serde::{Deserialize, Deserializer};

/// How an optional update field decides whether a supplied value applies.
///
/// The two rules must never be mixed silently on one field; each patch
/// field documents which rule it follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSemantics {
    /// The value applies only when non-empty; an empty string counts as
    /// "not provided". Required string fields (email, name, title) use
    /// this, so a patch can never clear them.
    NonEmpty,
    /// Any value present in the input applies, including null and false.
    /// Nullable and boolean fields (content, published) use this.
    Presence,
}

impl FieldSemantics {
    /// Normalize an optional string field under this rule
    pub fn filter(self, value: Option<String>) -> Option<String> {
        match self {
            FieldSemantics::NonEmpty => value.filter(|v| !v.is_empty()),
            FieldSemantics::Presence => value,
        }
    }
}

/// Input for creating a user. Both fields are required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

/// Input for creating a post. `published` is not accepted; every post
/// starts unpublished.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub author_id: i64,
}

/// Partial update for a user. Both fields follow `FieldSemantics::NonEmpty`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial update for a post.
///
/// `title` follows `FieldSemantics::NonEmpty`; `content` and `published`
/// follow `FieldSemantics::Presence`. The double option on `content`
/// distinguishes "field omitted" (None) from "explicitly null" (Some(None))
/// from "set to a value" (Some(Some(_))).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,
    #[serde(default)]
    pub published: Option<bool>,
}

/// Deserialize a present-but-possibly-null field into `Some(inner)`.
/// Serde only calls this when the key is present, so an omitted field
/// stays at the `None` default.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
