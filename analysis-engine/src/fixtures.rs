use chrono::{TimeZone, Utc};
use painpoint_core::{CleanedPost, KeywordSet, Post, RawPost, TaggedPost};

pub fn raw_post(title: &str, body: &str, upvotes: i64, num_comments: u64) -> RawPost {
    RawPost {
        subreddit: "smallbusiness".to_string(),
        title: Some(title.to_string()),
        body: Some(body.to_string()),
        author: "someone".to_string(),
        created_utc: Utc.with_ymd_and_hms(2025, 4, 30, 3, 25, 8).unwrap(),
        upvotes,
        num_comments,
        url: format!("https://reddit.com/r/smallbusiness/{}", title.replace(' ', "_")),
    }
}

pub fn tagged_post(
    subreddit: &str,
    title: &str,
    upvotes: i64,
    num_comments: u64,
    keywords: &[&str],
) -> TaggedPost {
    let mut raw = raw_post(title, "", upvotes, num_comments);
    raw.subreddit = subreddit.to_string();
    let post = Post::from_raw(raw).unwrap();
    TaggedPost {
        cleaned: CleanedPost::new(post),
        matched_keywords: keywords.iter().copied().collect::<KeywordSet>(),
    }
}
