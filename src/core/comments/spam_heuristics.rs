// Keyword and link-count heuristics for spotting spam comments.
//
// Pure functions over the comment body - no storage, no side effects.

use super::comment_models::ModerationConfig;

/// Words that mark a comment as spam wherever they appear (case-insensitive).
pub const DEFAULT_SPAM_KEYWORDS: &[&str] = &[
    "viagra", "cialis", "pharmacy", "casino", "gambling", "loan", "credit", "free", "money",
    "win", "prize", "lottery", "click", "here",
];

/// Result of running the heuristics over a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpamSignals {
    pub contains_spam_keywords: bool,
    pub has_suspicious_links: bool,
}

impl SpamSignals {
    pub fn is_spam(&self) -> bool {
        self.contains_spam_keywords || self.has_suspicious_links
    }
}

#[derive(Debug, Clone)]
pub struct SpamHeuristics {
    /// Lowercased, never empty
    keywords: Vec<String>,
    max_links: usize,
}

impl SpamHeuristics {
    pub fn new<I, K>(keywords: I, max_links: usize) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        // An empty keyword would match every body
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            keywords,
            max_links,
        }
    }

    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(&config.spam_keywords, config.max_links)
    }

    pub fn evaluate(&self, body: &str) -> SpamSignals {
        SpamSignals {
            contains_spam_keywords: self.contains_spam_keywords(body),
            has_suspicious_links: self.has_suspicious_links(body),
        }
    }

    pub fn contains_spam_keywords(&self, body: &str) -> bool {
        let body = body.to_lowercase();
        self.keywords.iter().any(|k| body.contains(k.as_str()))
    }

    pub fn has_suspicious_links(&self, body: &str) -> bool {
        count_links(body) > self.max_links
    }
}

impl Default for SpamHeuristics {
    fn default() -> Self {
        Self::from_config(&ModerationConfig::default())
    }
}

/// Count `http://` and `https://` occurrences. Case-sensitive.
pub fn count_links(body: &str) -> usize {
    // The two schemes can't overlap, so counting them separately is exact.
    body.matches("http://").count() + body.matches("https://").count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_clean() {
        let heuristics = SpamHeuristics::default();
        assert_eq!(heuristics.evaluate(""), SpamSignals::default());
    }

    #[test]
    fn test_keywords_match_anywhere_ignoring_case() {
        let heuristics = SpamHeuristics::default();

        assert!(heuristics.contains_spam_keywords("Buy VIAGRA now"));
        assert!(heuristics.contains_spam_keywords("best online CaSiNo"));
        // Substring match, same as the keyword list has always behaved
        assert!(heuristics.contains_spam_keywords("Winter is coming"));
        assert!(!heuristics.contains_spam_keywords("Great read, thanks for sharing these tips"));
    }

    #[test]
    fn test_link_threshold() {
        let heuristics = SpamHeuristics::default();

        assert!(!heuristics.has_suspicious_links("see http://a.com and https://b.com"));
        assert!(heuristics.has_suspicious_links("http://a.com http://b.com http://c.com check these"));
        assert!(heuristics.has_suspicious_links("https://a https://b https://c"));
        // Scheme match is case-sensitive
        assert!(!heuristics.has_suspicious_links("HTTP://a HTTP://b HTTP://c"));
    }

    #[test]
    fn test_count_links_mixed_schemes() {
        assert_eq!(count_links("http://a https://b http://c"), 3);
        assert_eq!(count_links("no links here"), 0);
    }

    #[test]
    fn test_custom_keywords_are_normalized() {
        let heuristics = SpamHeuristics::new(["  Crypto ", "", "   "], 5);

        assert!(heuristics.contains_spam_keywords("free CRYPTO giveaway"));
        assert!(!heuristics.contains_spam_keywords("anything else at all"));
        assert!(!heuristics.has_suspicious_links("http://a http://b http://c"));
    }
}
