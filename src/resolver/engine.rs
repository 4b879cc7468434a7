//! Resolver implementation
//!
//! Every operation is a single-shot request/response against the store;
//! the resolver keeps no state of its own, so each read observes fresh
//! rows. Timestamps are assigned here, never accepted from callers.
//! Failures propagate immediately; there are no retries and no silent
//! recovery.

use chrono::{SecondsFormat, Utc};

use crate::record::{Post, User};
use crate::resolver::input::{FieldSemantics, NewPost, NewUser, PostPatch, UserPatch};
use crate::storage::SqliteStore;
use crate::{Error, Result};

/// Current instant as an ISO-8601 UTC string with millisecond precision
fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query/mutation surface over the user and post tables
pub struct Resolver<'a> {
    store: &'a mut SqliteStore,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over an open store
    pub fn new(store: &'a mut SqliteStore) -> Self {
        Self { store }
    }

    // ========== Queries ==========

    /// All users, in id order. Relations are not populated here; callers
    /// that want a user's posts ask `user_posts` explicitly.
    pub fn users(&self) -> Result<Vec<User>> {
        self.store.list_users()
    }

    /// One user, or None when the id matches nothing. Absence is a valid
    /// result, never an error.
    pub fn user(&self, id: i64) -> Result<Option<User>> {
        self.store.get_user(id)
    }

    /// All posts, in id order
    pub fn posts(&self) -> Result<Vec<Post>> {
        self.store.list_posts()
    }

    /// One post, or None when the id matches nothing
    pub fn post(&self, id: i64) -> Result<Option<Post>> {
        self.store.get_post(id)
    }

    // ========== Relation fields ==========

    /// A user's posts, fetched only when a caller actually asks for the
    /// relation. A user with no posts (or an id matching nothing) yields
    /// an empty sequence, not an error.
    pub fn user_posts(&self, user_id: i64) -> Result<Vec<Post>> {
        self.store.posts_by_author(user_id)
    }

    /// A post's author, fetched on demand by the owning id
    pub fn post_author(&self, author_id: i64) -> Result<Option<User>> {
        self.store.get_user(author_id)
    }

    // ========== Mutations ==========

    /// Create a user. Both timestamps are set to the same instant.
    pub fn create_user(&mut self, input: NewUser) -> Result<User> {
        let now = now_iso8601();
        let id = self.store.insert_user(&input.email, &input.name, &now)?;
        self.store
            .get_user(id)?
            .ok_or(Error::Storage(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Apply a partial update to a user. Both fields follow
    /// `FieldSemantics::NonEmpty`: an empty string counts as "not
    /// provided" and cannot clear the field. `updated_at` is refreshed
    /// even when no field survives normalization. Returns None when the
    /// id matches nothing.
    pub fn update_user(&mut self, id: i64, patch: UserPatch) -> Result<Option<User>> {
        let email = FieldSemantics::NonEmpty.filter(patch.email);
        let name = FieldSemantics::NonEmpty.filter(patch.name);

        let now = now_iso8601();
        self.store
            .update_user(id, email.as_deref(), name.as_deref(), &now)?;
        self.store.get_user(id)
    }

    /// Delete a user and, atomically with it, every post it owns. Returns
    /// the pre-delete snapshot, or None when the id matches nothing.
    pub fn delete_user(&mut self, id: i64) -> Result<Option<User>> {
        let Some(user) = self.store.get_user(id)? else {
            return Ok(None);
        };
        self.store.delete_user_cascade(id)?;
        Ok(Some(user))
    }

    /// Create a post. `published` starts false. Empty content collapses to
    /// NULL at creation, the same as leaving it out. The author must
    /// exist; the foreign key constraint backs this check up under races.
    pub fn create_post(&mut self, input: NewPost) -> Result<Post> {
        if self.store.get_user(input.author_id)?.is_none() {
            return Err(Error::UnknownAuthor(input.author_id));
        }

        let now = now_iso8601();
        let content = input.content.as_deref().filter(|c| !c.is_empty());
        let id = self
            .store
            .insert_post(&input.title, content, input.author_id, &now)?;
        self.store
            .get_post(id)?
            .ok_or(Error::Storage(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Apply a partial update to a post. `title` follows
    /// `FieldSemantics::NonEmpty`; `content` and `published` follow
    /// `FieldSemantics::Presence`, so an explicit null clears content and
    /// an explicit false unpublishes. Returns None when the id matches
    /// nothing.
    pub fn update_post(&mut self, id: i64, patch: PostPatch) -> Result<Option<Post>> {
        let title = FieldSemantics::NonEmpty.filter(patch.title);

        let now = now_iso8601();
        self.store.update_post(
            id,
            title.as_deref(),
            patch.content.as_ref().map(|c| c.as_deref()),
            patch.published,
            &now,
        )?;
        self.store.get_post(id)
    }

    /// Delete a single post, returning the pre-delete snapshot. No cascade.
    pub fn delete_post(&mut self, id: i64) -> Result<Option<Post>> {
        let Some(post) = self.store.get_post(id)? else {
            return Ok(None);
        };
        self.store.delete_post(id)?;
        Ok(Some(post))
    }
}
