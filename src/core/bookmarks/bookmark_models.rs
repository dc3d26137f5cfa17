// Bookmark domain models: saved websites readers browse by category.

use super::bookmark_service::BookmarkError;
use crate::core::text::is_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Bookmarks per page when browsing or searching.
pub const PAGE_SIZE: usize = 20;
pub const RELATED_LIMIT: usize = 6;

const SCREENSHOT_SERVICE: &str = "https://api.screenshotmachine.com/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    /// Who saved it, if anyone
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn display_tags(&self) -> String {
        self.tags.join(", ")
    }

    /// Host part of the URL, or the URL itself if it won't parse.
    pub fn domain(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.clone())
    }

    /// The stored image if there is one, otherwise a generated screenshot link.
    pub fn screenshot_url(&self) -> String {
        match self.image_url.as_deref() {
            Some(image) if !is_blank(image) => image.to_string(),
            _ => {
                let target: String =
                    url::form_urlencoded::byte_serialize(self.url.as_bytes()).collect();
                format!("{SCREENSHOT_SERVICE}?key=demo&url={target}&dimension=1024x768")
            }
        }
    }

    pub fn color_scheme(&self) -> ColorScheme {
        let (primary, secondary) = match self.category.to_lowercase().as_str() {
            "design" => ("#6366f1", "#a855f7"),
            "development" => ("#10b981", "#06b6d4"),
            "inspiration" => ("#f59e0b", "#ef4444"),
            "tools" => ("#8b5cf6", "#ec4899"),
            "resources" => ("#06b6d4", "#10b981"),
            _ => ("#6b7280", "#9ca3af"),
        };
        ColorScheme { primary, secondary }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorScheme {
    pub primary: &'static str,
    pub secondary: &'static str,
}

/// Input for saving a bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub user_id: Option<i64>,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub published: bool,
}

impl NewBookmark {
    pub fn validate(&self) -> Result<(), BookmarkError> {
        if is_blank(&self.title) {
            return Err(invalid("Title can't be blank"));
        }
        if self.title.trim().chars().count() > MAX_TITLE_CHARS {
            return Err(invalid(&format!(
                "Title is too long (maximum is {MAX_TITLE_CHARS} characters)"
            )));
        }
        if is_blank(&self.url) {
            return Err(invalid("Url can't be blank"));
        }
        if url::Url::parse(self.url.trim()).is_err() {
            return Err(invalid("Url is invalid"));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_CHARS {
                return Err(invalid(&format!(
                    "Description is too long (maximum is {MAX_DESCRIPTION_CHARS} characters)"
                )));
            }
        }
        if is_blank(&self.category) {
            return Err(invalid("Category can't be blank"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> BookmarkError {
    BookmarkError::ValidationError(message.to_string())
}

/// Trimmed, non-empty, first occurrence wins.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkSort {
    /// Newest first
    #[default]
    Recent,
    /// Most viewed, then most liked
    Popular,
    /// Most liked
    Liked,
}

impl BookmarkSort {
    /// Unknown or missing values fall back to `Recent`.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("popular") => Self::Popular,
            Some("liked") => Self::Liked,
            _ => Self::Recent,
        }
    }
}

/// Filters for browsing the directory. Only published bookmarks are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkQuery {
    pub category: Option<String>,
    /// Matched against title, description, tags and category
    pub search: Option<String>,
    pub sort: BookmarkSort,
    pub offset: usize,
}

impl BookmarkQuery {
    /// Blank filters count as no filter.
    pub fn normalized(self) -> Self {
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            category: present(self.category),
            search: present(self.search),
            ..self
        }
    }
}

/// One page of the directory plus the numbers shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkPage {
    pub bookmarks: Vec<BookmarkCard>,
    /// All published bookmarks, ignoring filters
    pub total: u64,
    /// Published bookmarks per category
    pub categories: BTreeMap<String, u64>,
    pub search_query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkDetail {
    pub bookmark: BookmarkCard,
    pub related: Vec<BookmarkCard>,
}

/// The JSON shape the directory pages render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkCard {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub domain: String,
    pub image_url: String,
    pub category: String,
    pub tags: Vec<String>,
    pub views_count: i64,
    pub likes_count: i64,
    pub featured: bool,
    pub color_scheme: ColorScheme,
    pub created_at: DateTime<Utc>,
}

impl From<&Bookmark> for BookmarkCard {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id,
            title: bookmark.title.clone(),
            description: bookmark.description.clone(),
            url: bookmark.url.clone(),
            domain: bookmark.domain(),
            image_url: bookmark.screenshot_url(),
            category: bookmark.category.clone(),
            tags: bookmark.tags.clone(),
            views_count: bookmark.views_count,
            likes_count: bookmark.likes_count,
            featured: bookmark.featured,
            color_scheme: bookmark.color_scheme(),
            created_at: bookmark.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(url: &str, category: &str) -> Bookmark {
        let now = Utc::now();
        Bookmark {
            id: 1,
            user_id: None,
            title: "Rust docs".to_string(),
            description: None,
            url: url.to_string(),
            image_url: None,
            category: category.to_string(),
            tags: vec!["rust".to_string(), "docs".to_string()],
            featured: false,
            published: true,
            views_count: 0,
            likes_count: 0,
            published_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn new_bookmark() -> NewBookmark {
        NewBookmark {
            user_id: Some(1),
            title: "The Rust Book".to_string(),
            url: "https://doc.rust-lang.org/book/".to_string(),
            description: Some("Free online book".to_string()),
            image_url: None,
            category: "development".to_string(),
            tags: vec![],
            featured: false,
            published: true,
        }
    }

    #[test]
    fn test_domain_and_fallback() {
        assert_eq!(
            bookmark("https://doc.rust-lang.org/book/", "x").domain(),
            "doc.rust-lang.org"
        );
        assert_eq!(bookmark("not a url", "x").domain(), "not a url");
    }

    #[test]
    fn test_screenshot_url() {
        let mut saved = bookmark("https://example.com/a b", "x");
        assert_eq!(
            saved.screenshot_url(),
            "https://api.screenshotmachine.com/?key=demo&url=https%3A%2F%2Fexample.com%2Fa+b&dimension=1024x768"
        );

        saved.image_url = Some("https://cdn.example.com/shot.png".to_string());
        assert_eq!(saved.screenshot_url(), "https://cdn.example.com/shot.png");
    }

    #[test]
    fn test_color_scheme_by_category() {
        assert_eq!(bookmark("https://a.io", "Design").color_scheme().primary, "#6366f1");
        assert_eq!(bookmark("https://a.io", "tools").color_scheme().secondary, "#ec4899");
        assert_eq!(bookmark("https://a.io", "misc").color_scheme().primary, "#6b7280");
    }

    #[test]
    fn test_validation() {
        assert!(new_bookmark().validate().is_ok());

        let cases = [
            NewBookmark { title: "  ".to_string(), ..new_bookmark() },
            NewBookmark { title: "t".repeat(201), ..new_bookmark() },
            NewBookmark { url: "".to_string(), ..new_bookmark() },
            NewBookmark { url: "doc.rust-lang.org".to_string(), ..new_bookmark() },
            NewBookmark { description: Some("d".repeat(501)), ..new_bookmark() },
            NewBookmark { category: " ".to_string(), ..new_bookmark() },
        ];
        for case in cases {
            assert!(
                matches!(case.validate(), Err(BookmarkError::ValidationError(_))),
                "{case:?}"
            );
        }
    }

    #[test]
    fn test_normalize_tags() {
        let tags: Vec<String> = [" rust", "", "web", "rust", "  "]
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(normalize_tags(&tags), vec!["rust", "web"]);
    }

    #[test]
    fn test_sort_param() {
        assert_eq!(BookmarkSort::from_param(Some("popular")), BookmarkSort::Popular);
        assert_eq!(BookmarkSort::from_param(Some("liked")), BookmarkSort::Liked);
        assert_eq!(BookmarkSort::from_param(Some("oldest")), BookmarkSort::Recent);
        assert_eq!(BookmarkSort::from_param(None), BookmarkSort::Recent);
    }

    #[test]
    fn test_card_json() {
        let card = BookmarkCard::from(&bookmark("https://doc.rust-lang.org/", "development"));
        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["domain"], "doc.rust-lang.org");
        assert_eq!(json["color_scheme"]["primary"], "#10b981");
        assert_eq!(json["tags"][1], "docs");
    }
}
