use painpoint_core::{KeywordGroupSummary, KeywordPrioritySummary, TaggedPost};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_TOP_POSTS: usize = 5;

/// One `(keyword, post)` pair per matched keyword of every post.
pub fn explode(posts: &[TaggedPost]) -> impl Iterator<Item = (&str, &TaggedPost)> {
    posts
        .iter()
        .flat_map(|post| post.matched_keywords.iter().map(move |kw| (kw, post)))
}

/// Counts posts per (subreddit, keyword), highest count first.
///
/// Equal counts are ordered by subreddit, then keyword.
pub fn group_by_subreddit_keyword(posts: &[TaggedPost]) -> Vec<KeywordGroupSummary> {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for (keyword, post) in explode(posts) {
        *counts
            .entry((post.post().subreddit.as_str(), keyword))
            .or_default() += 1;
    }

    let mut summary: Vec<KeywordGroupSummary> = counts
        .into_iter()
        .map(|((subreddit, keyword), count)| KeywordGroupSummary {
            subreddit: subreddit.to_string(),
            keyword: keyword.to_string(),
            count,
        })
        .collect();
    summary.sort_by(|a, b| b.count.cmp(&a.count));

    debug!("Grouped pain points into {} subreddit/keyword rows", summary.len());
    summary
}

#[derive(Default)]
struct KeywordTotals {
    num_posts: u64,
    total_upvotes: i64,
    total_comments: u64,
}

/// Ranks keywords by number of posts, then by total upvotes.
///
/// Keywords tied on both keep alphabetical order.
pub fn prioritize(posts: &[TaggedPost]) -> Vec<KeywordPrioritySummary> {
    let mut totals: BTreeMap<&str, KeywordTotals> = BTreeMap::new();
    for (keyword, post) in explode(posts) {
        let entry = totals.entry(keyword).or_default();
        entry.num_posts += 1;
        entry.total_upvotes += post.post().upvotes;
        entry.total_comments += post.post().num_comments;
    }

    let mut summary: Vec<KeywordPrioritySummary> = totals
        .into_iter()
        .map(|(keyword, t)| KeywordPrioritySummary {
            keyword: keyword.to_string(),
            num_posts: t.num_posts,
            total_upvotes: t.total_upvotes,
            avg_upvotes: t.total_upvotes as f64 / t.num_posts as f64,
            total_comments: t.total_comments,
            avg_comments: t.total_comments as f64 / t.num_posts as f64,
        })
        .collect();
    summary.sort_by(|a, b| {
        b.num_posts
            .cmp(&a.num_posts)
            .then(b.total_upvotes.cmp(&a.total_upvotes))
    });

    debug!("Prioritized {} pain point keywords", summary.len());
    summary
}

/// The `n` highest-upvoted posts mentioning `keyword`. Posts with equal
/// upvotes keep their input order.
pub fn top_posts_for_keyword<'a>(
    posts: &'a [TaggedPost],
    keyword: &str,
    n: usize,
) -> Vec<&'a TaggedPost> {
    let mut matching: Vec<&TaggedPost> = posts.iter().filter(|p| p.has_keyword(keyword)).collect();
    matching.sort_by(|a, b| b.post().upvotes.cmp(&a.post().upvotes));
    matching.truncate(n);
    matching
}

/// Subreddits with the most posts mentioning `keyword`, with their counts.
/// Equal counts are ordered by subreddit name.
pub fn top_subreddits_for_keyword(
    posts: &[TaggedPost],
    keyword: &str,
    n: usize,
) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for post in posts.iter().filter(|p| p.has_keyword(keyword)) {
        *counts.entry(post.post().subreddit.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(subreddit, count)| (subreddit.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}
