// SQLite-backed comment store.
//
// Tables:
// - comments: Comment bodies plus their moderation status

use crate::core::comments::{Comment, CommentError, CommentStore, ModerationStatus, NewComment};
use crate::infra::database::parse_timestamp;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteCommentStore {
    pool: Pool<Sqlite>,
}

impl SqliteCommentStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), CommentError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                body TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'approved', 'rejected')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CommentError::StorageError(e.to_string()))?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_comments_status ON comments(status)",
            "CREATE INDEX IF NOT EXISTS idx_comments_post_status ON comments(post_id, status)",
            "CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(user_id)",
        ] {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .map_err(|e| CommentError::StorageError(e.to_string()))?;
        }

        Ok(())
    }

    fn row_to_comment(row: &SqliteRow) -> Result<Comment, CommentError> {
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Comment {
            id: row.get("id"),
            post_id: row.get("post_id"),
            user_id: row.get("user_id"),
            body: row.get("body"),
            status: status.parse()?,
            created_at: parse_timestamp(&created_at).map_err(CommentError::StorageError)?,
            updated_at: parse_timestamp(&updated_at).map_err(CommentError::StorageError)?,
        })
    }

    async fn fetch_existing(&self, comment_id: i64) -> Result<Comment, CommentError> {
        self.get_comment(comment_id)
            .await?
            .ok_or(CommentError::NotFound(comment_id))
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, CommentError> {
        let now = Utc::now();
        let status = ModerationStatus::Pending;

        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, user_id, body, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(comment.body.as_str())
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| CommentError::StorageError(e.to_string()))?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            post_id: comment.post_id,
            user_id: comment.user_id,
            body: comment.body,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>, CommentError> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CommentError::StorageError(e.to_string()))?;

        row.as_ref().map(Self::row_to_comment).transpose()
    }

    async fn count_approved_by_author(&self, user_id: i64) -> Result<u64, CommentError> {
        let row = sqlx::query("SELECT COUNT(*) FROM comments WHERE user_id = ? AND status = ?")
            .bind(user_id)
            .bind(ModerationStatus::Approved.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CommentError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>(0) as u64)
    }

    async fn update_status(
        &self,
        comment_id: i64,
        status: ModerationStatus,
    ) -> Result<Comment, CommentError> {
        let result = sqlx::query("UPDATE comments SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| CommentError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CommentError::NotFound(comment_id));
        }

        self.fetch_existing(comment_id).await
    }

    async fn update_body(&self, comment_id: i64, body: &str) -> Result<Comment, CommentError> {
        let result = sqlx::query("UPDATE comments SET body = ?, updated_at = ? WHERE id = ?")
            .bind(body)
            .bind(Utc::now().to_rfc3339())
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| CommentError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CommentError::NotFound(comment_id));
        }

        self.fetch_existing(comment_id).await
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, CommentError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| CommentError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_status(
        &self,
        status: ModerationStatus,
        limit: usize,
    ) -> Result<Vec<Comment>, CommentError> {
        let rows = sqlx::query("SELECT * FROM comments WHERE status = ? ORDER BY id ASC LIMIT ?")
            .bind(status.as_str())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CommentError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_comment).collect()
    }

    async fn list_by_status_after(
        &self,
        status: ModerationStatus,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<Comment>, CommentError> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE status = ? AND id > ? ORDER BY id ASC LIMIT ?",
        )
        .bind(status.as_str())
        .bind(after_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CommentError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_comment).collect()
    }

    async fn list_approved_for_post(&self, post_id: i64) -> Result<Vec<Comment>, CommentError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM comments
            WHERE post_id = ? AND status = ?
            ORDER BY id DESC
            "#,
        )
        .bind(post_id)
        .bind(ModerationStatus::Approved.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CommentError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_comment).collect()
    }
}
