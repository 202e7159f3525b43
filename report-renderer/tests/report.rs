use analysis_engine::prioritize;
use chrono::{NaiveDate, TimeZone, Utc};
use painpoint_core::{CleanedPost, KeywordSet, Post, ReportSettings, TaggedPost};
use report_renderer::{MarkdownReport, ReportData, ReportOptions, ReportRenderer};

fn tagged(subreddit: &str, title: &str, body: &str, upvotes: i64, keywords: &[&str]) -> TaggedPost {
    let post = Post {
        subreddit: subreddit.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        author: "someone".to_string(),
        created_utc: Utc.with_ymd_and_hms(2024, 4, 30, 3, 25, 8).unwrap(),
        upvotes,
        num_comments: 2,
        url: format!("https://reddit.com/r/{}/{}", subreddit, upvotes),
    };
    TaggedPost {
        cleaned: CleanedPost::new(post),
        matched_keywords: keywords.iter().copied().collect::<KeywordSet>(),
    }
}

fn options(top_n: usize, posts_per_pain: usize) -> ReportOptions {
    ReportOptions::new(
        &ReportSettings {
            top_n,
            posts_per_pain,
        },
        NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
    )
}

#[test]
fn test_report_limits_pain_points_and_examples() {
    let posts = vec![
        tagged("Shopify", "Checkout bug", "it fails", 50, &["bug"]),
        tagged("Shopify", "Another bug", "again", 10, &["bug"]),
        tagged("retail", "POS bug", "help", 30, &["bug", "issue"]),
        tagged("retail", "Printer issue", "jams", 5, &["issue"]),
        tagged("ecommerce", "I wish", "for more", 1, &["wish"]),
    ];
    let priority = prioritize(&posts);

    let data = ReportData::build(&priority, &posts, &options(2, 2));
    assert_eq!(data.total_posts, 5);
    assert_eq!(data.pain_points.len(), 2);

    let bug = &data.pain_points[0];
    assert_eq!(bug.keyword, "bug");
    assert_eq!(bug.frequency, 3);
    assert_eq!(bug.top_subreddits, vec!["Shopify", "retail"]);
    let titles: Vec<&str> = bug.examples.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Checkout bug", "POS bug"]);

    let rendered = MarkdownReport.render(&data).unwrap();
    assert!(rendered.contains("Top Pain Points Identified: 2"));
    assert!(!rendered.contains("## Pain Point: wish"));
}

#[test]
fn test_long_bodies_are_excerpted() {
    let body = format!("{}\n{}", "a".repeat(150), "b".repeat(100));
    let posts = vec![tagged("Shopify", "Long bug", &body, 3, &["bug"])];
    let priority = prioritize(&posts);

    let data = ReportData::build(&priority, &posts, &options(5, 3));
    let excerpt = &data.pain_points[0].examples[0].excerpt;

    assert_eq!(excerpt.len(), 203);
    assert!(excerpt.ends_with("..."));
    assert!(!excerpt.contains('\n'));
    assert_eq!(&excerpt[150..151], " ");
}
