// SQLite-backed tag store.

use crate::core::tags::{prepare_tag, Tag, TagError, TagStore};
use crate::infra::database::{like_pattern, parse_timestamp};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteTagStore {
    pool: Pool<Sqlite>,
}

impl SqliteTagStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), TagError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                slug TEXT NOT NULL UNIQUE,
                description TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| TagError::StorageError(e.to_string()))?;

        Ok(())
    }

    pub(crate) fn row_to_tag(row: &SqliteRow) -> Result<Tag, TagError> {
        let created_at: String = row.get("created_at");

        Ok(Tag {
            id: row.get("id"),
            name: row.get("name"),
            slug: row.get("slug"),
            description: row.get("description"),
            created_at: parse_timestamp(&created_at).map_err(TagError::StorageError)?,
        })
    }
}

#[async_trait]
impl TagStore for SqliteTagStore {
    async fn create_tag(&self, name: &str, description: Option<&str>) -> Result<Tag, TagError> {
        let (name, slug) = prepare_tag(name)?;

        let taken = sqlx::query("SELECT EXISTS(SELECT 1 FROM tags WHERE name = ? OR slug = ?)")
            .bind(name.as_str())
            .bind(slug.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TagError::StorageError(e.to_string()))?
            .get::<i64, _>(0)
            != 0;
        if taken {
            return Err(TagError::ValidationError(
                "Name has already been taken".to_string(),
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tags (name, slug, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name.as_str())
        .bind(slug.as_str())
        .bind(description)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| TagError::StorageError(e.to_string()))?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name,
            slug,
            description: description.map(str::to_string),
            created_at: now,
        })
    }

    async fn find_matching(&self, words: &[String], limit: usize) -> Result<Vec<Tag>, TagError> {
        if words.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        // LIKE is case-insensitive for ASCII in SQLite
        let conditions = vec!["name LIKE ? ESCAPE '\\'"; words.len()].join(" OR ");
        let sql = format!("SELECT * FROM tags WHERE {conditions} ORDER BY id ASC LIMIT ?");

        let mut query = sqlx::query(&sql);
        for word in words {
            query = query.bind(like_pattern(word));
        }

        let rows = query
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TagError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_tag).collect()
    }
}
