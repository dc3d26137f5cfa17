// Bookmark directory service - browsing, search and counters.
//
// Readers page through published bookmarks, optionally narrowed to a
// category or a search term, sorted by recency, views or likes.

use super::bookmark_models::{
    normalize_tags, Bookmark, BookmarkCard, BookmarkDetail, BookmarkPage, BookmarkQuery,
    BookmarkSort, NewBookmark, PAGE_SIZE, RELATED_LIMIT,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Bookmark not found: {0}")]
    NotFound(i64),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<Bookmark, BookmarkError>;

    async fn get_bookmark(&self, bookmark_id: i64) -> Result<Option<Bookmark>, BookmarkError>;

    /// Published bookmarks matching the query, in its sort order, starting
    /// at `query.offset`.
    async fn list_published(
        &self,
        query: &BookmarkQuery,
        limit: usize,
    ) -> Result<Vec<Bookmark>, BookmarkError>;

    /// Featured and published, newest first.
    async fn list_featured(&self, limit: usize) -> Result<Vec<Bookmark>, BookmarkError>;

    /// Other published bookmarks in the same category.
    async fn list_related(
        &self,
        bookmark: &Bookmark,
        limit: usize,
    ) -> Result<Vec<Bookmark>, BookmarkError>;

    /// Published bookmark count per category.
    async fn count_by_category(&self) -> Result<BTreeMap<String, u64>, BookmarkError>;

    /// Returns the new count. Fails with `NotFound` for unknown ids.
    async fn increment_views(&self, bookmark_id: i64) -> Result<i64, BookmarkError>;

    /// Returns the new count. Fails with `NotFound` for unknown ids.
    async fn increment_likes(&self, bookmark_id: i64) -> Result<i64, BookmarkError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct BookmarkDirectoryService<S: BookmarkStore> {
    store: S,
}

impl<S: BookmarkStore> BookmarkDirectoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn add_bookmark(&self, bookmark: NewBookmark) -> Result<Bookmark, BookmarkError> {
        bookmark.validate()?;

        let bookmark = NewBookmark {
            title: bookmark.title.trim().to_string(),
            url: bookmark.url.trim().to_string(),
            category: bookmark.category.trim().to_string(),
            tags: normalize_tags(&bookmark.tags),
            ..bookmark
        };
        let saved = self.store.create_bookmark(bookmark).await?;
        tracing::info!(bookmark_id = saved.id, category = %saved.category, "Bookmark saved");
        Ok(saved)
    }

    /// One page of the directory with category counts.
    pub async fn browse(&self, query: BookmarkQuery) -> Result<BookmarkPage, BookmarkError> {
        let query = query.normalized();
        let bookmarks = self.store.list_published(&query, PAGE_SIZE).await?;
        let categories = self.store.count_by_category().await?;

        Ok(BookmarkPage {
            bookmarks: bookmarks.iter().map(BookmarkCard::from).collect(),
            total: categories.values().sum(),
            categories,
            search_query: query.search,
        })
    }

    /// Newest matches for `term`. A blank term lists the newest bookmarks.
    pub async fn search(&self, term: &str) -> Result<Vec<BookmarkCard>, BookmarkError> {
        let query = BookmarkQuery {
            search: Some(term.to_string()),
            sort: BookmarkSort::Recent,
            ..Default::default()
        }
        .normalized();

        let bookmarks = self.store.list_published(&query, PAGE_SIZE).await?;
        Ok(bookmarks.iter().map(BookmarkCard::from).collect())
    }

    pub async fn featured(&self) -> Result<Vec<BookmarkCard>, BookmarkError> {
        let bookmarks = self.store.list_featured(PAGE_SIZE).await?;
        Ok(bookmarks.iter().map(BookmarkCard::from).collect())
    }

    /// A bookmark with a handful of others from its category.
    pub async fn show(&self, bookmark_id: i64) -> Result<BookmarkDetail, BookmarkError> {
        let bookmark = self
            .store
            .get_bookmark(bookmark_id)
            .await?
            .ok_or(BookmarkError::NotFound(bookmark_id))?;
        let related = self.store.list_related(&bookmark, RELATED_LIMIT).await?;

        Ok(BookmarkDetail {
            bookmark: BookmarkCard::from(&bookmark),
            related: related.iter().map(BookmarkCard::from).collect(),
        })
    }

    pub async fn record_view(&self, bookmark_id: i64) -> Result<i64, BookmarkError> {
        self.store.increment_views(bookmark_id).await
    }

    /// Likes only ever go up; there is no per-user like record.
    pub async fn add_like(&self, bookmark_id: i64) -> Result<i64, BookmarkError> {
        self.store.increment_likes(bookmark_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// In-memory store for testing
    struct MockBookmarkStore {
        bookmarks: DashMap<i64, Bookmark>,
        next_id: AtomicI64,
    }

    impl MockBookmarkStore {
        fn new() -> Self {
            Self {
                bookmarks: DashMap::new(),
                next_id: AtomicI64::new(1),
            }
        }

        fn published(&self) -> Vec<Bookmark> {
            let mut all: Vec<Bookmark> = self
                .bookmarks
                .iter()
                .filter(|b| b.published)
                .map(|b| b.clone())
                .collect();
            all.sort_by(|a, b| b.id.cmp(&a.id));
            all
        }

        fn bump(&self, id: i64, likes: bool) -> Result<i64, BookmarkError> {
            let mut bookmark = self
                .bookmarks
                .get_mut(&id)
                .ok_or(BookmarkError::NotFound(id))?;
            let counter = if likes {
                &mut bookmark.likes_count
            } else {
                &mut bookmark.views_count
            };
            *counter += 1;
            Ok(*counter)
        }
    }

    #[async_trait]
    impl BookmarkStore for MockBookmarkStore {
        async fn create_bookmark(&self, new: NewBookmark) -> Result<Bookmark, BookmarkError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            let bookmark = Bookmark {
                id,
                user_id: new.user_id,
                title: new.title,
                description: new.description,
                url: new.url,
                image_url: new.image_url,
                category: new.category,
                tags: new.tags,
                featured: new.featured,
                published: new.published,
                views_count: 0,
                likes_count: 0,
                published_at: new.published.then_some(now),
                created_at: now,
                updated_at: now,
            };
            self.bookmarks.insert(id, bookmark.clone());
            Ok(bookmark)
        }

        async fn get_bookmark(&self, id: i64) -> Result<Option<Bookmark>, BookmarkError> {
            Ok(self.bookmarks.get(&id).map(|b| b.clone()))
        }

        async fn list_published(
            &self,
            query: &BookmarkQuery,
            limit: usize,
        ) -> Result<Vec<Bookmark>, BookmarkError> {
            let mut matches: Vec<Bookmark> = self
                .published()
                .into_iter()
                .filter(|b| query.category.as_ref().map_or(true, |c| &b.category == c))
                .filter(|b| {
                    query.search.as_ref().map_or(true, |term| {
                        let term = term.to_lowercase();
                        b.title.to_lowercase().contains(&term)
                            || b.category.to_lowercase().contains(&term)
                            || b.tags.iter().any(|t| t.to_lowercase().contains(&term))
                    })
                })
                .collect();
            match query.sort {
                BookmarkSort::Recent => {}
                BookmarkSort::Popular => matches.sort_by(|a, b| {
                    (b.views_count, b.likes_count).cmp(&(a.views_count, a.likes_count))
                }),
                BookmarkSort::Liked => matches.sort_by(|a, b| b.likes_count.cmp(&a.likes_count)),
            }
            Ok(matches.into_iter().skip(query.offset).take(limit).collect())
        }

        async fn list_featured(&self, limit: usize) -> Result<Vec<Bookmark>, BookmarkError> {
            Ok(self
                .published()
                .into_iter()
                .filter(|b| b.featured)
                .take(limit)
                .collect())
        }

        async fn list_related(
            &self,
            bookmark: &Bookmark,
            limit: usize,
        ) -> Result<Vec<Bookmark>, BookmarkError> {
            Ok(self
                .published()
                .into_iter()
                .filter(|b| b.category == bookmark.category && b.id != bookmark.id)
                .take(limit)
                .collect())
        }

        async fn count_by_category(&self) -> Result<BTreeMap<String, u64>, BookmarkError> {
            let mut counts = BTreeMap::new();
            for bookmark in self.published() {
                *counts.entry(bookmark.category).or_insert(0) += 1;
            }
            Ok(counts)
        }

        async fn increment_views(&self, id: i64) -> Result<i64, BookmarkError> {
            self.bump(id, false)
        }

        async fn increment_likes(&self, id: i64) -> Result<i64, BookmarkError> {
            self.bump(id, true)
        }
    }

    fn new_bookmark(title: &str, category: &str) -> NewBookmark {
        NewBookmark {
            user_id: None,
            title: title.to_string(),
            url: format!("https://{}.example.com/", category.trim()),
            description: None,
            image_url: None,
            category: category.to_string(),
            tags: vec![],
            featured: false,
            published: true,
        }
    }

    async fn seeded() -> BookmarkDirectoryService<MockBookmarkStore> {
        let service = BookmarkDirectoryService::new(MockBookmarkStore::new());
        for (title, category) in [
            ("Figma", "design"),
            ("Tokio docs", "development"),
            ("Dribbble", "design"),
            ("Crates.io", "development"),
        ] {
            service.add_bookmark(new_bookmark(title, category)).await.unwrap();
        }
        service
            .add_bookmark(NewBookmark {
                published: false,
                ..new_bookmark("Secret draft", "design")
            })
            .await
            .unwrap();
        service
    }

    fn titles(cards: &[BookmarkCard]) -> Vec<&str> {
        cards.iter().map(|c| c.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_bookmark_normalizes_input() {
        let service = BookmarkDirectoryService::new(MockBookmarkStore::new());

        let saved = service
            .add_bookmark(NewBookmark {
                tags: vec![" css".to_string(), "css".to_string(), "".to_string()],
                ..new_bookmark("  Figma  ", " design ")
            })
            .await
            .unwrap();

        assert_eq!(saved.title, "Figma");
        assert_eq!(saved.category, "design");
        assert_eq!(saved.tags, vec!["css"]);
        assert!(saved.published_at.is_some());

        let err = service
            .add_bookmark(new_bookmark("", "design"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookmarkError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_browse_hides_unpublished_and_counts_categories() {
        let service = seeded().await;

        let page = service.browse(BookmarkQuery::default()).await.unwrap();

        assert_eq!(
            titles(&page.bookmarks),
            vec!["Crates.io", "Dribbble", "Tokio docs", "Figma"]
        );
        assert_eq!(page.total, 4);
        assert_eq!(page.categories.get("design"), Some(&2));
        assert_eq!(page.categories.get("development"), Some(&2));
        assert!(page.search_query.is_none());
    }

    #[tokio::test]
    async fn test_browse_filters_and_sorts() {
        let service = seeded().await;
        // Tokio docs (id 2): 3 views, 1 like. Figma (id 1): 1 view, 2 likes.
        for _ in 0..3 {
            service.record_view(2).await.unwrap();
        }
        service.record_view(1).await.unwrap();
        service.add_like(2).await.unwrap();
        service.add_like(1).await.unwrap();
        assert_eq!(service.add_like(1).await.unwrap(), 2);

        let popular = service
            .browse(BookmarkQuery {
                sort: BookmarkSort::Popular,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&popular.bookmarks)[..2], ["Tokio docs", "Figma"]);

        let liked = service
            .browse(BookmarkQuery {
                sort: BookmarkSort::Liked,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&liked.bookmarks)[..2], ["Figma", "Tokio docs"]);

        let design = service
            .browse(BookmarkQuery {
                category: Some("design".to_string()),
                search: Some("   ".to_string()),
                offset: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(titles(&design.bookmarks), vec!["Figma"]);
        assert!(design.search_query.is_none());
        // Counts ignore the filters
        assert_eq!(design.total, 4);
    }

    #[tokio::test]
    async fn test_search_and_featured() {
        let service = seeded().await;
        service
            .add_bookmark(NewBookmark {
                featured: true,
                ..new_bookmark("Rust playground", "tools")
            })
            .await
            .unwrap();

        let found = service.search("TOKIO").await.unwrap();
        assert_eq!(titles(&found), vec!["Tokio docs"]);

        let all = service.search("").await.unwrap();
        assert_eq!(all.len(), 5);

        let featured = service.featured().await.unwrap();
        assert_eq!(titles(&featured), vec!["Rust playground"]);
    }

    #[tokio::test]
    async fn test_show_includes_related() {
        let service = seeded().await;

        let detail = service.show(1).await.unwrap();
        assert_eq!(detail.bookmark.title, "Figma");
        assert_eq!(titles(&detail.related), vec!["Dribbble"]);

        assert!(matches!(service.show(99).await, Err(BookmarkError::NotFound(99))));
        assert!(matches!(
            service.record_view(99).await,
            Err(BookmarkError::NotFound(99))
        ));
    }
}
