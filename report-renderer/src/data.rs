use analysis_engine::{top_posts_for_keyword, top_subreddits_for_keyword};
use chrono::NaiveDate;
use painpoint_core::{KeywordPrioritySummary, ReportSettings, TaggedPost};
use serde::Serialize;

pub const EXCERPT_CHARS: usize = 200;
pub const TOP_SUBREDDITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_n: usize,
    pub posts_per_pain: usize,
    pub generated_on: NaiveDate,
}

impl ReportOptions {
    pub fn new(settings: &ReportSettings, generated_on: NaiveDate) -> Self {
        Self {
            top_n: settings.top_n,
            posts_per_pain: settings.posts_per_pain,
            generated_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamplePost {
    pub title: String,
    pub subreddit: String,
    pub upvotes: i64,
    pub excerpt: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PainPointSection {
    pub keyword: String,
    pub frequency: u64,
    pub avg_upvotes: f64,
    pub avg_comments: f64,
    pub top_subreddits: Vec<String>,
    pub examples: Vec<ExamplePost>,
}

/// Everything a renderer needs, already ranked and truncated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportData {
    pub generated_on: NaiveDate,
    pub total_posts: usize,
    pub pain_points: Vec<PainPointSection>,
}

impl ReportData {
    /// Takes the first `top_n` rows of an already ranked priority summary.
    pub fn build(
        priority: &[KeywordPrioritySummary],
        posts: &[TaggedPost],
        options: &ReportOptions,
    ) -> Self {
        let pain_points = priority
            .iter()
            .take(options.top_n)
            .map(|row| PainPointSection {
                keyword: row.keyword.clone(),
                frequency: row.num_posts,
                avg_upvotes: row.avg_upvotes,
                avg_comments: row.avg_comments,
                top_subreddits: top_subreddits_for_keyword(posts, &row.keyword, TOP_SUBREDDITS)
                    .into_iter()
                    .map(|(subreddit, _)| subreddit)
                    .collect(),
                examples: top_posts_for_keyword(posts, &row.keyword, options.posts_per_pain)
                    .into_iter()
                    .map(|tagged| {
                        let post = tagged.post();
                        ExamplePost {
                            title: post.title.clone(),
                            subreddit: post.subreddit.clone(),
                            upvotes: post.upvotes,
                            excerpt: excerpt(&post.body, EXCERPT_CHARS),
                            url: post.url.clone(),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            generated_on: options.generated_on,
            total_posts: posts.len(),
            pain_points,
        }
    }
}

/// The first `max_chars` characters of `body` on one line, with "..." when
/// anything was cut.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let mut chars = body.chars();
    let mut out: String = chars
        .by_ref()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_characters() {
        let body = "é".repeat(250);
        let cut = excerpt(&body, EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), 203);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_excerpt_keeps_short_bodies() {
        assert_eq!(excerpt("line one\nline two", 200), "line one line two");
        assert_eq!(excerpt("", 200), "");
        assert_eq!(excerpt(&"x".repeat(200), 200), "x".repeat(200));
    }
}
