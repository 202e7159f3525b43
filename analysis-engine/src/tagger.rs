use painpoint_core::{CleanedPost, KeywordSet, PainKeywords, TaggedPost};
use tracing::{info, warn};

/// Keywords that occur in `text` as contiguous substrings.
///
/// There is no word-boundary check, so "issue" matches "issues" and "hard"
/// matches "hardware".
pub fn find_keywords(text: &str, keywords: &PainKeywords) -> KeywordSet {
    keywords.iter().filter(|kw| text.contains(kw)).collect()
}

/// Matched keywords across the normalized title and body of a post.
pub fn match_post(post: &CleanedPost, keywords: &PainKeywords) -> KeywordSet {
    let mut matched = find_keywords(post.title_clean.as_str(), keywords);
    matched.union_with(find_keywords(post.body_clean.as_str(), keywords));
    matched
}

/// Keeps the posts that mention at least one pain-point keyword and attaches
/// the matched set to each of them.
pub fn tag_pain_points(posts: Vec<CleanedPost>, keywords: &PainKeywords) -> Vec<TaggedPost> {
    let tagged: Vec<TaggedPost> = posts
        .into_iter()
        .filter_map(|cleaned| {
            let matched_keywords = match_post(&cleaned, keywords);
            if matched_keywords.is_empty() {
                None
            } else {
                Some(TaggedPost {
                    cleaned,
                    matched_keywords,
                })
            }
        })
        .collect();

    if tagged.is_empty() {
        warn!("No pain point posts found");
    } else {
        info!("Extracted {} pain point posts.", tagged.len());
    }
    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::RecordCleaner;
    use crate::fixtures::raw_post;
    use painpoint_core::{CleaningConfig, Post};

    fn cleaned(title: &str, body: &str) -> CleanedPost {
        CleanedPost::new(Post::from_raw(raw_post(title, body, 1, 0)).unwrap())
    }

    #[test]
    fn test_substring_matching_without_word_boundaries() {
        let keywords = PainKeywords::new(["issue", "issues", "hard"]);
        let matched = find_keywords("no issues with hardware", &keywords);
        assert_eq!(
            matched.iter().collect::<Vec<_>>(),
            vec!["hard", "issue", "issues"]
        );
    }

    #[test]
    fn test_multi_word_keyword_matches_across_whitespace() {
        let keywords = PainKeywords::new(["pain point", "need help"]);
        assert!(find_keywords("the biggest pain point is billing", &keywords).contains("pain point"));
        assert!(find_keywords("pain  point", &keywords).is_empty());
        assert!(find_keywords("painpoint", &keywords).is_empty());
    }

    #[test]
    fn test_title_and_body_matches_are_merged() {
        let keywords = PainKeywords::new(["bug", "wish", "broken"]);
        let post = cleaned("Found a BUG", "I wish this bug was fixed");
        let matched = match_post(&post, &keywords);
        assert_eq!(matched.iter().collect::<Vec<_>>(), vec!["bug", "wish"]);
    }

    #[test]
    fn test_posts_without_matches_are_excluded() {
        let keywords = PainKeywords::new(["bug"]);
        let tagged = tag_pain_points(
            vec![cleaned("All good", "nothing here"), cleaned("Bug report", "")],
            &keywords,
        );
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].post().title, "Bug report");
    }

    #[test]
    fn test_every_match_is_a_substring_of_the_text() {
        let keywords = PainKeywords::default();
        let posts = vec![
            cleaned("Struggling with inventory", "Biggest challenge: missing stock"),
            cleaned("Feature request!", "Please improve the dashboard"),
            cleaned("Happy news", "We launched"),
        ];
        let tagged = tag_pain_points(posts, &keywords);

        assert_eq!(tagged.len(), 2);
        for post in &tagged {
            assert!(!post.matched_keywords.is_empty());
            for keyword in post.matched_keywords.iter() {
                assert!(
                    post.cleaned.title_clean.contains(keyword)
                        || post.cleaned.body_clean.contains(keyword)
                );
            }
        }
    }

    #[test]
    fn test_example_scenario() {
        let mut p3 = raw_post("duplicate", "", 0, 0);
        p3.body = Some(String::new());
        let raw = vec![
            raw_post("this is a bug", "", 5, 2),
            raw_post("no issues here", "", 1, 0),
            p3,
        ];

        let cleaned = RecordCleaner::new(CleaningConfig {
            min_upvotes: 1,
            min_comments: 0,
        })
        .clean(raw)
        .posts;
        assert_eq!(cleaned.len(), 2);

        let tagged = tag_pain_points(cleaned, &PainKeywords::new(["bug", "issue"]));
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[0].matched_keywords, ["bug"].into_iter().collect::<KeywordSet>());
        assert_eq!(tagged[1].matched_keywords, ["issue"].into_iter().collect::<KeywordSet>());
    }
}
