//! SQLite storage implementation

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, ToSql, params};
use serde::Serialize;

use super::schema;
use crate::Result;
use crate::record::{Post, User};

/// SQLite-backed storage for users and posts.
///
/// Each method is a single parameterized statement (or, for the cascade
/// delete, one transaction). Timestamps arrive pre-formatted from the
/// resolution layer; this type never generates them.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema and connection-scoped pragmas
    fn initialize_schema(&self) -> Result<()> {
        // foreign_keys is per-connection state, not part of the schema
        self.conn.pragma_update(None, "foreign_keys", true)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== User Operations ==========

    /// Insert a user, returning the storage-assigned id
    pub fn insert_user(&self, email: &str, name: &str, now: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO users (email, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, name, now, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a user by id
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, name, created_at, updated_at FROM users WHERE id = ?1",
                [id],
                |row| self.row_to_user(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all users in id order
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email, name, created_at, updated_at FROM users ORDER BY id")?;

        let users = stmt
            .query_map([], |row| self.row_to_user(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(users)
    }

    /// Apply a partial update to a user. `updated_at` is always written;
    /// `email` and `name` only when supplied. Returns the number of
    /// affected rows (zero when the id matches nothing).
    pub fn update_user(
        &self,
        id: i64,
        email: Option<&str>,
        name: Option<&str>,
        now: &str,
    ) -> Result<usize> {
        let mut assignments = vec!["updated_at = ?"];
        let mut values: Vec<&dyn ToSql> = vec![&now];

        if let Some(ref email) = email {
            assignments.push("email = ?");
            values.push(email);
        }
        if let Some(ref name) = name {
            assignments.push("name = ?");
            values.push(name);
        }
        values.push(&id);

        let sql = format!("UPDATE users SET {} WHERE id = ?", assignments.join(", "));
        let affected = self.conn.execute(&sql, &values[..])?;
        Ok(affected)
    }

    /// Delete a user and every post that references it, as one transaction.
    /// A crash or concurrent reader never observes the cascade half-done;
    /// the transaction rolls back on drop if either statement fails.
    pub fn delete_user_cascade(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM posts WHERE author_id = ?1", [id])?;
        tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(())
    }

    /// Count all users
    pub fn count_users(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a User
    fn row_to_user(&self, row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    // ========== Post Operations ==========

    /// Insert a post, returning the storage-assigned id.
    /// `published` always starts false.
    pub fn insert_post(
        &self,
        title: &str,
        content: Option<&str>,
        author_id: i64,
        now: &str,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO posts (title, content, published, author_id, created_at, updated_at) VALUES (?1, ?2, 0, ?3, ?4, ?5)",
            params![title, content, author_id, now, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a post by id
    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        self.conn
            .query_row(
                "SELECT id, title, content, published, author_id, created_at, updated_at FROM posts WHERE id = ?1",
                [id],
                |row| self.row_to_post(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all posts in id order
    pub fn list_posts(&self) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, published, author_id, created_at, updated_at FROM posts ORDER BY id",
        )?;

        let posts = stmt
            .query_map([], |row| self.row_to_post(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(posts)
    }

    /// All posts owned by one user, in id order
    pub fn posts_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, published, author_id, created_at, updated_at FROM posts WHERE author_id = ?1 ORDER BY id",
        )?;

        let posts = stmt
            .query_map([author_id], |row| self.row_to_post(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(posts)
    }

    /// Apply a partial update to a post. `updated_at` is always written.
    /// The double option on `content` carries "set to NULL" (Some(None))
    /// distinctly from "leave alone" (None).
    pub fn update_post(
        &self,
        id: i64,
        title: Option<&str>,
        content: Option<Option<&str>>,
        published: Option<bool>,
        now: &str,
    ) -> Result<usize> {
        let mut assignments = vec!["updated_at = ?"];
        let mut values: Vec<&dyn ToSql> = vec![&now];

        if let Some(ref title) = title {
            assignments.push("title = ?");
            values.push(title);
        }
        if let Some(ref content) = content {
            assignments.push("content = ?");
            values.push(content);
        }
        if let Some(ref published) = published {
            assignments.push("published = ?");
            values.push(published);
        }
        values.push(&id);

        let sql = format!("UPDATE posts SET {} WHERE id = ?", assignments.join(", "));
        let affected = self.conn.execute(&sql, &values[..])?;
        Ok(affected)
    }

    /// Delete a single post. No cascade.
    pub fn delete_post(&self, id: i64) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", [id])?;
        Ok(affected)
    }

    /// Count all posts
    pub fn count_posts(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Post
    fn row_to_post(&self, row: &rusqlite::Row) -> rusqlite::Result<Post> {
        Ok(Post {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            // stored as 0/1, surfaced as a real boolean
            published: row.get(3)?,
            author_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            users: self.count_users()?,
            posts: self.count_posts()?,
        })
    }
}

/// Row counts for the two tables
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub users: usize,
    pub posts: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} users, {} posts", self.users, self.posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2024-01-01T00:00:00.000Z";
    const LATER: &str = "2024-01-02T00:00:00.000Z";

    fn store_with_user(email: &str, name: &str) -> (SqliteStore, i64) {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_user(email, name, NOW).unwrap();
        (store, id)
    }

    #[test]
    fn test_user_crud() {
        let (store, id) = store_with_user("a@x.com", "A");

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "A");
        assert_eq!(user.created_at, NOW);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_get_user_absent_is_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get_user(42).unwrap().is_none());
    }

    #[test]
    fn test_list_users_in_id_order() {
        let (store, first) = store_with_user("a@x.com", "A");
        let second = store.insert_user("b@x.com", "B", NOW).unwrap();

        let ids: Vec<i64> = store.list_users().unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_update_user_partial() {
        let (store, id) = store_with_user("a@x.com", "A");

        let affected = store.update_user(id, None, Some("B"), LATER).unwrap();
        assert_eq!(affected, 1);

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "B");
        assert_eq!(user.created_at, NOW);
        assert_eq!(user.updated_at, LATER);
    }

    #[test]
    fn test_update_missing_user_affects_no_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.update_user(42, Some("a@x.com"), None, NOW).unwrap(), 0);
    }

    #[test]
    fn test_post_crud_normalizes_published() {
        let (store, author) = store_with_user("a@x.com", "A");
        let id = store.insert_post("T", Some("body"), author, NOW).unwrap();

        let post = store.get_post(id).unwrap().unwrap();
        assert!(!post.published);
        assert_eq!(post.content.as_deref(), Some("body"));

        store.update_post(id, None, None, Some(true), LATER).unwrap();
        let post = store.get_post(id).unwrap().unwrap();
        assert!(post.published);
        assert_eq!(post.updated_at, LATER);
    }

    #[test]
    fn test_update_post_explicit_null_clears_content() {
        let (store, author) = store_with_user("a@x.com", "A");
        let id = store.insert_post("T", Some("body"), author, NOW).unwrap();

        store.update_post(id, None, Some(None), None, LATER).unwrap();

        let post = store.get_post(id).unwrap().unwrap();
        assert_eq!(post.content, None);
        assert_eq!(post.title, "T");
    }

    #[test]
    fn test_insert_post_enforces_author_fk() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.insert_post("T", None, 42, NOW).is_err());
    }

    #[test]
    fn test_delete_user_cascades_to_posts() {
        let (mut store, author) = store_with_user("a@x.com", "A");
        store.insert_post("T1", None, author, NOW).unwrap();
        store.insert_post("T2", None, author, NOW).unwrap();

        store.delete_user_cascade(author).unwrap();

        assert!(store.get_user(author).unwrap().is_none());
        assert!(store.posts_by_author(author).unwrap().is_empty());
        assert_eq!(store.count_posts().unwrap(), 0);
    }

    #[test]
    fn test_posts_by_author_only_returns_owned_rows() {
        let (store, a) = store_with_user("a@x.com", "A");
        let b = store.insert_user("b@x.com", "B", NOW).unwrap();
        store.insert_post("mine", None, a, NOW).unwrap();
        store.insert_post("theirs", None, b, NOW).unwrap();

        let posts = store.posts_by_author(a).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "mine");
    }

    #[test]
    fn test_stats() {
        let (store, author) = store_with_user("a@x.com", "A");
        store.insert_post("T", None, author, NOW).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.posts, 1);
    }
}
