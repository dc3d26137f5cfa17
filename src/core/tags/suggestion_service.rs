// Tag suggestions for post content.
//
// Pulls likely topics out of a post body (known tech keywords plus words the
// author keeps repeating) and splits them into tags that already exist and
// brand new ones worth creating.

use crate::core::text::{is_blank, slugify};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const MAX_CANDIDATES: usize = 10;
const MAX_EXISTING: usize = 5;
const MAX_NEW: usize = 3;
const MIN_REPEATS: usize = 2;
const MIN_TOPIC_CHARS: usize = 4;

const TECH_KEYWORDS: &[&str] = &[
    "ruby", "rails", "javascript", "react", "vue", "angular", "node", "python", "django", "flask",
    "fastapi", "java", "spring", "kotlin", "php", "laravel", "symfony", "go", "rust", "swift",
    "database", "sql", "postgresql", "mysql", "mongodb", "redis", "docker", "kubernetes", "aws",
    "azure", "gcp", "git", "github", "gitlab", "testing", "rspec", "jest", "cypress", "api",
    "rest", "graphql", "frontend", "backend", "fullstack", "mobile", "ios", "android", "machine",
    "learning", "ai", "data", "science", "devops", "ci", "cd", "deployment", "security",
    "authentication", "authorization", "performance", "optimization", "tutorial", "guide",
    "howto", "tips",
];

const COMMON_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "his", "how", "man", "new", "now", "old", "see", "two",
    "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use", "that", "with",
    "have", "this", "will", "your", "from", "they", "know", "want", "been", "good", "much",
    "some", "time", "very", "when", "come", "here", "just", "like", "long", "make", "many",
    "over", "such", "take", "than", "them", "well", "were", "what", "where", "which", "work",
    "would", "could", "should", "about", "after", "again", "against", "because", "before",
    "being", "between", "both", "during", "each", "few", "more", "most", "other", "since",
    "through", "until", "while",
];

// ============================================================================
// MODELS & ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    /// Always trimmed and lowercase
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSuggestions {
    pub existing_tags: Vec<Tag>,
    pub new_suggestions: Vec<String>,
    /// Existing tag names followed by new suggestions, without repeats
    pub all_suggestions: Vec<String>,
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Tag names are stored trimmed and lowercase.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalized name and slug for a new tag, or why it can't be created.
pub fn prepare_tag(name: &str) -> Result<(String, String), TagError> {
    let name = normalize_tag_name(name);
    if name.is_empty() {
        return Err(TagError::ValidationError("Name can't be blank".to_string()));
    }
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(TagError::ValidationError(
            "Name needs at least one letter or digit".to_string(),
        ));
    }
    Ok((name, slug))
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait TagStore: Send + Sync {
    /// Create a tag. Names are unique ignoring case.
    async fn create_tag(&self, name: &str, description: Option<&str>) -> Result<Tag, TagError>;

    /// Tags whose name contains any of `words` (case-insensitive), oldest first.
    async fn find_matching(&self, words: &[String], limit: usize) -> Result<Vec<Tag>, TagError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct TagSuggestionService<S: TagStore> {
    store: S,
}

impl<S: TagStore> TagSuggestionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create_tag(&self, name: &str, description: Option<&str>) -> Result<Tag, TagError> {
        self.store.create_tag(name, description).await
    }

    pub async fn suggest(&self, content: &str) -> Result<TagSuggestions, TagError> {
        if is_blank(content) {
            return Err(TagError::ValidationError(
                "Content is required".to_string(),
            ));
        }

        let candidates = extract_candidates(content);
        let existing_tags = if candidates.is_empty() {
            Vec::new()
        } else {
            self.store.find_matching(&candidates, MAX_EXISTING).await?
        };
        let new_suggestions = new_suggestions(&candidates, &existing_tags);

        let mut seen = HashSet::new();
        let all_suggestions = existing_tags
            .iter()
            .map(|t| t.name.clone())
            .chain(new_suggestions.iter().cloned())
            .filter(|name| seen.insert(name.clone()))
            .collect();

        Ok(TagSuggestions {
            existing_tags,
            new_suggestions,
            all_suggestions,
        })
    }
}

/// Lowercased words, split on anything that isn't `[A-Za-z0-9_]`.
fn words(content: &str) -> Vec<String> {
    content
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tech keywords in order of appearance, then repeated topic words, capped at 10.
pub fn extract_candidates(content: &str) -> Vec<String> {
    let words = words(content);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for word in &words {
        let count = counts.entry(word.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(word.as_str());
        }
        *count += 1;
    }

    let tech = first_seen
        .iter()
        .filter(|w| TECH_KEYWORDS.contains(*w));
    let frequent = first_seen.iter().filter(|w| {
        counts[**w] >= MIN_REPEATS && w.len() >= MIN_TOPIC_CHARS && !COMMON_WORDS.contains(*w)
    });

    let mut seen = HashSet::new();
    tech.chain(frequent)
        .filter(|w| seen.insert(**w))
        .take(MAX_CANDIDATES)
        .map(|w| w.to_string())
        .collect()
}

/// Candidates not already covered by an existing tag name, capped at 3.
fn new_suggestions(candidates: &[String], existing: &[Tag]) -> Vec<String> {
    let existing_names: Vec<String> = existing.iter().map(|t| t.name.to_lowercase()).collect();

    candidates
        .iter()
        .filter(|word| {
            !existing_names
                .iter()
                .any(|name| name.contains(word.as_str()) || word.contains(name.as_str()))
        })
        .take(MAX_NEW)
        .cloned()
        .collect()
}
