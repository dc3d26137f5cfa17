// SQLite-backed post store.
//
// Tables:
// - posts: Post content and publication state
// - post_tags: Which tags are on which post (reads join `tags`)

use crate::core::posts::{Post, PostDraft, PostError, PostStore};
use crate::core::tags::Tag;
use crate::infra::database::parse_timestamp;
use crate::infra::tags::SqliteTagStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqlitePostStore {
    pool: Pool<Sqlite>,
}

impl SqlitePostStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), PostError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                excerpt TEXT,
                published BOOLEAN NOT NULL DEFAULT 0,
                published_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS post_tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(post_id, tag_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_posts_published ON posts(published)",
            "CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_post_tags_tag ON post_tags(tag_id)",
        ] {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .map_err(|e| PostError::StorageError(e.to_string()))?;
        }

        Ok(())
    }

    fn row_to_post(row: &SqliteRow) -> Result<Post, PostError> {
        let timestamp =
            |value: &str| parse_timestamp(value).map_err(PostError::StorageError);

        let published_at: Option<String> = row.get("published_at");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Post {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            slug: row.get("slug"),
            content: row.get("content"),
            excerpt: row.get("excerpt"),
            published: row.get("published"),
            published_at: published_at.as_deref().map(timestamp).transpose()?,
            created_at: timestamp(&created_at)?,
            updated_at: timestamp(&updated_at)?,
        })
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn create_post(&self, draft: PostDraft) -> Result<Post, PostError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO posts (user_id, title, slug, content, excerpt, published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(draft.user_id)
        .bind(draft.title.as_str())
        .bind(draft.slug.as_str())
        .bind(draft.content.as_str())
        .bind(draft.excerpt.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        Ok(Post {
            id: result.last_insert_rowid(),
            user_id: draft.user_id,
            title: draft.title,
            slug: draft.slug,
            content: draft.content,
            excerpt: Some(draft.excerpt),
            published: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_post(&self, post_id: i64) -> Result<Option<Post>, PostError> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PostError::StorageError(e.to_string()))?;

        row.as_ref().map(Self::row_to_post).transpose()
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, PostError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = ?)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PostError::StorageError(e.to_string()))?;

        Ok(row.get::<i64, _>(0) != 0)
    }

    async fn set_published(
        &self,
        post_id: i64,
        published: bool,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Post, PostError> {
        let result = sqlx::query(
            "UPDATE posts SET published = ?, published_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(published)
        .bind(published_at.map(|t| t.to_rfc3339()))
        .bind(Utc::now().to_rfc3339())
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PostError::NotFound(post_id));
        }

        self.get_post(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))
    }

    async fn attach_tag(&self, post_id: i64, tag_id: i64) -> Result<bool, PostError> {
        let tag_exists = sqlx::query("SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?)")
            .bind(tag_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PostError::StorageError(e.to_string()))?
            .get::<i64, _>(0)
            != 0;
        if !tag_exists {
            return Err(PostError::ValidationError(format!("Tag {tag_id} does not exist")));
        }

        let result = sqlx::query(
            "INSERT OR IGNORE INTO post_tags (post_id, tag_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(post_id)
        .bind(tag_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn tags_for_post(&self, post_id: i64) -> Result<Vec<Tag>, PostError> {
        let rows = sqlx::query(
            r#"
            SELECT tags.* FROM tags
            JOIN post_tags ON post_tags.tag_id = tags.id
            WHERE post_tags.post_id = ?
            ORDER BY post_tags.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                SqliteTagStore::row_to_tag(row).map_err(|e| PostError::StorageError(e.to_string()))
            })
            .collect()
    }

    async fn list_published_by_tag(&self, tag_slug: &str) -> Result<Vec<Post>, PostError> {
        let rows = sqlx::query(
            r#"
            SELECT posts.* FROM posts
            JOIN post_tags ON post_tags.post_id = posts.id
            JOIN tags ON tags.id = post_tags.tag_id
            WHERE tags.slug = ? AND posts.published = 1
            ORDER BY posts.id DESC
            "#,
        )
        .bind(tag_slug)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PostError::StorageError(e.to_string()))?;

        rows.iter().map(Self::row_to_post).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::posts::{NewPost, PostPublisherService};
    use crate::core::tags::TagStore;
    use crate::core::users::{AccessPolicy, User};
    use crate::infra::database::connect;
    use crate::infra::notifications::TracingNotifier;
    use tempfile::TempDir;

    async fn test_store() -> (SqlitePostStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.db");
        let pool = connect(path.to_str().unwrap()).await.unwrap();
        SqliteTagStore::new(pool.clone()).migrate().await.unwrap();
        let store = SqlitePostStore::new(pool);
        store.migrate().await.unwrap();
        (store, dir)
    }

    fn draft(slug: &str) -> PostDraft {
        PostDraft {
            user_id: 1,
            title: "Hello World".to_string(),
            slug: slug.to_string(),
            content: "Some content".to_string(),
            excerpt: "Some content".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_fetch_and_publish() {
        let (store, _dir) = test_store().await;

        let post = store.create_post(draft("hello-world")).await.unwrap();
        assert_eq!(store.get_post(post.id).await.unwrap().unwrap(), post);
        assert!(store.slug_exists("hello-world").await.unwrap());
        assert!(!store.slug_exists("something-else").await.unwrap());

        let when = Utc::now();
        let published = store.set_published(post.id, true, Some(when)).await.unwrap();
        assert!(published.published);
        assert_eq!(published.published_at, Some(when));

        let draft_again = store.set_published(post.id, false, None).await.unwrap();
        assert!(!draft_again.published);
        assert!(draft_again.published_at.is_none());

        assert!(matches!(
            store.set_published(999, true, None).await,
            Err(PostError::NotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_a_storage_error() {
        let (store, _dir) = test_store().await;
        store.create_post(draft("same")).await.unwrap();

        let err = store.create_post(draft("same")).await.unwrap_err();
        assert!(matches!(err, PostError::StorageError(_)));
    }

    #[tokio::test]
    async fn test_post_tags_and_by_tag_listing() {
        let (store, _dir) = test_store().await;
        let tags = SqliteTagStore::new(store.pool.clone());
        let rust = tags.create_tag("Rust", None).await.unwrap();
        let web = tags.create_tag("web", None).await.unwrap();

        let older = store.create_post(draft("older")).await.unwrap();
        let newer = store.create_post(draft("newer")).await.unwrap();
        let hidden = store.create_post(draft("hidden")).await.unwrap();

        assert!(store.attach_tag(older.id, web.id).await.unwrap());
        assert!(store.attach_tag(older.id, rust.id).await.unwrap());
        assert!(!store.attach_tag(older.id, rust.id).await.unwrap());
        store.attach_tag(newer.id, rust.id).await.unwrap();
        store.attach_tag(hidden.id, rust.id).await.unwrap();
        assert!(matches!(
            store.attach_tag(older.id, 999).await,
            Err(PostError::ValidationError(_))
        ));

        let names: Vec<String> = store
            .tags_for_post(older.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["web", "rust"]);

        store.set_published(older.id, true, Some(Utc::now())).await.unwrap();
        store.set_published(newer.id, true, Some(Utc::now())).await.unwrap();

        let ids: Vec<i64> = store
            .list_published_by_tag("rust")
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(store.list_published_by_tag("go").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publisher_against_sqlite() {
        let (store, _dir) = test_store().await;
        let service = PostPublisherService::new(store, TracingNotifier, AccessPolicy::default());
        let author = User {
            id: 3,
            email: "writer@example.com".to_string(),
            first_name: "Wri".to_string(),
            last_name: "Ter".to_string(),
        };
        let post = NewPost {
            title: "Async Rust in anger".to_string(),
            content: "Pinning, wakers and executors.".to_string(),
        };

        let first = service.create_post(&author, post.clone()).await.unwrap();
        let second = service.create_post(&author, post).await.unwrap();
        assert_eq!(first.slug, "async-rust-in-anger");
        assert_eq!(second.slug, "async-rust-in-anger-2");

        let published = service.toggle_publication(&author, first.id).await.unwrap();
        assert!(published.published);
    }
}
