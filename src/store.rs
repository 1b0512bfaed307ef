//! SQLite persistence for scraped posts.
//!
//! One table, `posts(title, url UNIQUE, author, date, content)`. Rows are
//! written once per URL and never updated; a second insert of the same URL
//! is ignored. A fresh connection is opened and closed for every logical
//! operation, so no transaction spans more than one call.

use crate::models::StoredPost;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handle on the posts database file.
#[derive(Debug, Clone)]
pub struct PostStore {
    path: String,
}

impl PostStore {
    /// Point at a SQLite file; nothing is opened until the first operation.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);
        Ok(SqliteConnection::connect_with(&options).await?)
    }

    /// Create the `posts` table if it does not exist yet.
    #[instrument(level = "info", skip(self), fields(path = %self.path))]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                title TEXT,
                url TEXT UNIQUE,
                author TEXT,
                date TEXT,
                content TEXT
            )
            "#,
        )
        .execute(&mut conn)
        .await?;
        conn.close().await?;
        info!("Posts table ready");
        Ok(())
    }

    /// Insert `post` unless its URL is already stored.
    ///
    /// Returns whether a row was written. Storage errors are logged and
    /// reported as `false`; they never reach the caller.
    #[instrument(level = "info", skip_all, fields(url = %post.url))]
    pub async fn insert_if_new(&self, post: &StoredPost) -> bool {
        match self.try_insert(post).await {
            Ok(inserted) => {
                debug!(inserted, "Stored post");
                inserted
            }
            Err(e) => {
                error!(error = %e, "Database error; post not stored");
                false
            }
        }
    }

    async fn try_insert(&self, post: &StoredPost) -> Result<bool, StoreError> {
        let mut conn = self.connect().await?;
        let affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO posts (title, url, author, date, content)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.author)
        .bind(&post.date)
        .bind(&post.content)
        .execute(&mut conn)
        .await?
        .rows_affected();
        conn.close().await?;
        Ok(affected > 0)
    }

    /// All rows whose `date` equals `date` (an ISO calendar date), in
    /// insertion order.
    #[instrument(level = "info", skip(self))]
    pub async fn posts_for_date(&self, date: &str) -> Result<Vec<StoredPost>, StoreError> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query_as::<_, StoredPost>(
            r#"
            SELECT title, url, author, date, content
            FROM posts
            WHERE date = ?1
            ORDER BY rowid
            "#,
        )
        .bind(date)
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        info!(count = rows.len(), "Loaded posts for date");
        Ok(rows)
    }
}
