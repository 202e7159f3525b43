use crate::text::NormalizedText;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A post as it comes out of ingestion, before any validation.
///
/// `title` and `body` are optional because tabular sources can hold empty
/// cells; the cleaner drops those records.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub subreddit: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub author: String,
    pub created_utc: DateTime<Utc>,
    pub upvotes: i64,
    pub num_comments: u64,
    pub url: String,
}

/// A post with both text fields present.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub subreddit: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub created_utc: DateTime<Utc>,
    pub upvotes: i64,
    pub num_comments: u64,
    pub url: String,
}

impl Post {
    /// Returns `None` when the title or the body is missing.
    pub fn from_raw(raw: RawPost) -> Option<Self> {
        let RawPost {
            subreddit,
            title,
            body,
            author,
            created_utc,
            upvotes,
            num_comments,
            url,
        } = raw;

        Some(Self {
            subreddit,
            title: title?,
            body: body?,
            author,
            created_utc,
            upvotes,
            num_comments,
            url,
        })
    }
}

impl From<Post> for RawPost {
    fn from(post: Post) -> Self {
        Self {
            subreddit: post.subreddit,
            title: Some(post.title),
            body: Some(post.body),
            author: post.author,
            created_utc: post.created_utc,
            upvotes: post.upvotes,
            num_comments: post.num_comments,
            url: post.url,
        }
    }
}

/// A post that survived cleaning, with its normalized text attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedPost {
    pub post: Post,
    pub title_clean: NormalizedText,
    pub body_clean: NormalizedText,
}

impl CleanedPost {
    pub fn new(post: Post) -> Self {
        let title_clean = NormalizedText::normalize(&post.title);
        let body_clean = NormalizedText::normalize(&post.body);
        Self {
            post,
            title_clean,
            body_clean,
        }
    }
}

impl From<CleanedPost> for RawPost {
    fn from(cleaned: CleanedPost) -> Self {
        cleaned.post.into()
    }
}

/// Deduplicated set of keywords. Iteration order is sorted, which keeps
/// serialized output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        self.0.insert(keyword.into())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn union_with(&mut self, other: KeywordSet) {
        self.0.extend(other.0);
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A cleaned post carrying at least one pain-point keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedPost {
    pub cleaned: CleanedPost,
    pub matched_keywords: KeywordSet,
}

impl TaggedPost {
    pub fn post(&self) -> &Post {
        &self.cleaned.post
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.matched_keywords.contains(keyword)
    }
}

/// The configured pain-point keywords, normalized the same way post text is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PainKeywords(Vec<String>);

impl PainKeywords {
    /// Normalizes each keyword, dropping empties and repeats while keeping
    /// the configured order.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let normalized = keywords
            .into_iter()
            .map(|k| NormalizedText::normalize(k.as_ref()).into_string())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.clone()))
            .collect();
        Self(normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PainKeywords {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_KEYWORDS)
    }
}

/// One row per (subreddit, keyword) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroupSummary {
    pub subreddit: String,
    pub keyword: String,
    pub count: u64,
}

/// One row per keyword across all subreddits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPrioritySummary {
    pub keyword: String,
    pub num_posts: u64,
    pub total_upvotes: i64,
    pub avg_upvotes: f64,
    pub total_comments: u64,
    pub avg_comments: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Fetched { fetched: usize, matched: usize },
    Failed { reason: String, error_code: String },
}

/// What happened when one subreddit was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOutcome {
    pub subreddit: String,
    pub status: FetchStatus,
}

impl SourceOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, FetchStatus::Failed { .. })
    }
}

/// Result of an ingestion run: the posts collected plus one outcome per
/// subreddit, so "no matches" and "fetch failed" stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeManifest {
    pub outcomes: Vec<SourceOutcome>,
    pub posts: Vec<RawPost>,
}

impl ScrapeManifest {
    pub fn failed(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|o| !o.is_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(title: Option<&str>, body: Option<&str>) -> RawPost {
        RawPost {
            subreddit: "rust".to_string(),
            title: title.map(str::to_string),
            body: body.map(str::to_string),
            author: "ferris".to_string(),
            created_utc: Utc.with_ymd_and_hms(2025, 4, 29, 15, 45, 26).unwrap(),
            upvotes: 3,
            num_comments: 1,
            url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_post_from_raw_requires_text() {
        assert!(Post::from_raw(raw(Some("t"), Some("b"))).is_some());
        assert!(Post::from_raw(raw(None, Some("b"))).is_none());
        assert!(Post::from_raw(raw(Some("t"), None)).is_none());
        assert!(Post::from_raw(raw(Some("t"), Some(""))).is_some());
    }

    #[test]
    fn test_cleaned_post_round_trips_to_raw() {
        let original = raw(Some("Broken Build!"), Some("Help"));
        let cleaned = CleanedPost::new(Post::from_raw(original.clone()).unwrap());
        assert_eq!(cleaned.title_clean.as_str(), "broken build");
        assert_eq!(RawPost::from(cleaned), original);
    }

    #[test]
    fn test_keyword_set_is_order_independent() {
        let a: KeywordSet = ["issue", "bug", "issue"].into_iter().collect();
        let b: KeywordSet = ["bug", "issue"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec!["bug", "issue"]);
    }

    #[test]
    fn test_keyword_set_serializes_as_array() {
        let set: KeywordSet = ["wish", "bug"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["bug","wish"]"#);

        let back: KeywordSet = serde_json::from_str(r#"["wish","bug","bug"]"#).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_manifest_partitions_outcomes() {
        let manifest = ScrapeManifest {
            outcomes: vec![
                SourceOutcome {
                    subreddit: "a".to_string(),
                    status: FetchStatus::Fetched {
                        fetched: 10,
                        matched: 0,
                    },
                },
                SourceOutcome {
                    subreddit: "b".to_string(),
                    status: FetchStatus::Failed {
                        reason: "timeout".to_string(),
                        error_code: "REDDIT_TIMEOUT".to_string(),
                    },
                },
            ],
            posts: Vec::new(),
        };
        assert_eq!(manifest.succeeded().count(), 1);
        assert_eq!(manifest.failed().next().unwrap().subreddit, "b");
    }
}
