// SQLite-backed bookmark store.
//
// Tables:
// - bookmarks: Saved websites; `tags` is a JSON array stored as text

use crate::core::bookmarks::{
    Bookmark, BookmarkError, BookmarkQuery, BookmarkSort, BookmarkStore, NewBookmark,
};
use crate::infra::database::{like_pattern, parse_timestamp};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, QueryBuilder, Row, Sqlite};
use std::collections::BTreeMap;

pub struct SqliteBookmarkStore {
    pool: Pool<Sqlite>,
}

impl SqliteBookmarkStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), BookmarkError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER,
                title TEXT NOT NULL,
                description TEXT,
                url TEXT NOT NULL,
                image_url TEXT,
                category TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                featured BOOLEAN NOT NULL DEFAULT 0,
                published BOOLEAN NOT NULL DEFAULT 1,
                views_count INTEGER NOT NULL DEFAULT 0,
                likes_count INTEGER NOT NULL DEFAULT 0,
                published_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_bookmarks_category ON bookmarks(category)",
            "CREATE INDEX IF NOT EXISTS idx_bookmarks_featured ON bookmarks(featured)",
            "CREATE INDEX IF NOT EXISTS idx_bookmarks_published ON bookmarks(published)",
            "CREATE INDEX IF NOT EXISTS idx_bookmarks_published_at ON bookmarks(published_at)",
        ] {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .map_err(|e| BookmarkError::StorageError(e.to_string()))?;
        }

        Ok(())
    }

    fn row_to_bookmark(row: &SqliteRow) -> Result<Bookmark, BookmarkError> {
        let timestamp =
            |value: &str| parse_timestamp(value).map_err(BookmarkError::StorageError);

        let tags: String = row.get("tags");
        let published_at: Option<String> = row.get("published_at");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Bookmark {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            description: row.get("description"),
            url: row.get("url"),
            image_url: row.get("image_url"),
            category: row.get("category"),
            tags: serde_json::from_str(&tags)
                .map_err(|e| BookmarkError::StorageError(format!("Bad tags {tags:?}: {e}")))?,
            featured: row.get("featured"),
            published: row.get("published"),
            views_count: row.get("views_count"),
            likes_count: row.get("likes_count"),
            published_at: published_at.as_deref().map(timestamp).transpose()?,
            created_at: timestamp(&created_at)?,
            updated_at: timestamp(&updated_at)?,
        })
    }

    async fn increment(&self, column: &str, bookmark_id: i64) -> Result<i64, BookmarkError> {
        let sql = format!(
            "UPDATE bookmarks SET {column} = {column} + 1, updated_at = ? WHERE id = ? RETURNING {column}"
        );
        let row = sqlx::query(&sql)
            .bind(Utc::now().to_rfc3339())
            .bind(bookmark_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BookmarkError::StorageError(e.to_string()))?
            .ok_or(BookmarkError::NotFound(bookmark_id))?;

        Ok(row.get::<i64, _>(0))
    }
}

#[async_trait]
impl BookmarkStore for SqliteBookmarkStore {
    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<Bookmark, BookmarkError> {
        let now = Utc::now();
        let published_at = bookmark.published.then_some(now);
        let tags = serde_json::to_string(&bookmark.tags)
            .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO bookmarks (
                user_id, title, description, url, image_url, category, tags,
                featured, published, published_at, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(bookmark.user_id)
        .bind(bookmark.title.as_str())
        .bind(bookmark.description.as_deref())
        .bind(bookmark.url.as_str())
        .bind(bookmark.image_url.as_deref())
        .bind(bookmark.category.as_str())
        .bind(tags)
        .bind(bookmark.featured)
        .bind(bookmark.published)
        .bind(published_at.map(|t| t.to_rfc3339()))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        Ok(Bookmark {
            id: result.last_insert_rowid(),
            user_id: bookmark.user_id,
            title: bookmark.title,
            description: bookmark.description,
            url: bookmark.url,
            image_url: bookmark.image_url,
            category: bookmark.category,
            tags: bookmark.tags,
            featured: bookmark.featured,
            published: bookmark.published,
            views_count: 0,
            likes_count: 0,
            published_at,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_bookmark(&self, bookmark_id: i64) -> Result<Option<Bookmark>, BookmarkError> {
        let row = sqlx::query("SELECT * FROM bookmarks WHERE id = ?")
            .bind(bookmark_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        row.as_ref().map(Self::row_to_bookmark).transpose()
    }

    async fn list_published(
        &self,
        query: &BookmarkQuery,
        limit: usize,
    ) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM bookmarks WHERE published = 1");

        if let Some(category) = &query.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(term) = &query.search {
            let pattern = like_pattern(term);
            builder.push(" AND (");
            for (i, column) in ["title", "description", "tags", "category"].iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder
                    .push(format!("{column} LIKE "))
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\'");
            }
            builder.push(")");
        }

        builder.push(match query.sort {
            BookmarkSort::Recent => " ORDER BY id DESC",
            BookmarkSort::Popular => " ORDER BY views_count DESC, likes_count DESC, id DESC",
            BookmarkSort::Liked => " ORDER BY likes_count DESC, id DESC",
        });
        builder
            .push(" LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(query.offset as i64);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_bookmark).collect()
    }

    async fn list_featured(&self, limit: usize) -> Result<Vec<Bookmark>, BookmarkError> {
        let rows = sqlx::query(
            "SELECT * FROM bookmarks WHERE featured = 1 AND published = 1 ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_bookmark).collect()
    }

    async fn list_related(
        &self,
        bookmark: &Bookmark,
        limit: usize,
    ) -> Result<Vec<Bookmark>, BookmarkError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM bookmarks
            WHERE published = 1 AND category = ? AND id != ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(bookmark.category.as_str())
        .bind(bookmark.id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_bookmark).collect()
    }

    async fn count_by_category(&self) -> Result<BTreeMap<String, u64>, BookmarkError> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) AS total FROM bookmarks WHERE published = 1 GROUP BY category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BookmarkError::StorageError(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| (row.get("category"), row.get::<i64, _>("total") as u64))
            .collect())
    }

    async fn increment_views(&self, bookmark_id: i64) -> Result<i64, BookmarkError> {
        self.increment("views_count", bookmark_id).await
    }

    async fn increment_likes(&self, bookmark_id: i64) -> Result<i64, BookmarkError> {
        self.increment("likes_count", bookmark_id).await
    }
}
