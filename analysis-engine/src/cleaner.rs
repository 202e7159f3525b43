use painpoint_core::{CleanedPost, CleaningConfig, Post, RawPost};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Counts of what each cleaning step removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub input: usize,
    pub duplicates_removed: usize,
    pub incomplete_removed: usize,
    pub below_threshold_removed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOutcome {
    pub posts: Vec<CleanedPost>,
    pub stats: CleaningStats,
}

/// Deduplicates, drops incomplete records, normalizes text and applies the
/// engagement thresholds, in that order.
#[derive(Debug, Clone, Default)]
pub struct RecordCleaner {
    config: CleaningConfig,
}

impl RecordCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> CleaningConfig {
        self.config
    }

    pub fn clean(&self, raw: Vec<RawPost>) -> CleaningOutcome {
        let mut stats = CleaningStats {
            input: raw.len(),
            ..Default::default()
        };

        let unique = dedup_by_text(raw);
        stats.duplicates_removed = stats.input - unique.len();

        let complete: Vec<Post> = unique.into_iter().filter_map(Post::from_raw).collect();
        stats.incomplete_removed = stats.input - stats.duplicates_removed - complete.len();

        let before_threshold = complete.len();
        let posts: Vec<CleanedPost> = complete
            .into_iter()
            .filter(|post| self.meets_thresholds(post))
            .map(CleanedPost::new)
            .collect();
        stats.below_threshold_removed = before_threshold - posts.len();
        stats.remaining = posts.len();

        debug!(
            "Cleaning removed {} duplicates, {} incomplete, {} below thresholds",
            stats.duplicates_removed, stats.incomplete_removed, stats.below_threshold_removed
        );
        if posts.is_empty() {
            warn!("No posts remaining after cleaning");
        } else {
            info!("Data cleaned. {} posts remaining after cleaning.", posts.len());
        }

        CleaningOutcome { posts, stats }
    }

    fn meets_thresholds(&self, post: &Post) -> bool {
        post.upvotes >= self.config.min_upvotes && post.num_comments >= self.config.min_comments
    }
}

/// Keeps the first record of every (title, body) pair. Missing values compare
/// equal to each other.
fn dedup_by_text(raw: Vec<RawPost>) -> Vec<RawPost> {
    let mut seen: HashSet<(Option<String>, Option<String>)> = HashSet::with_capacity(raw.len());
    raw.into_iter()
        .filter(|post| seen.insert((post.title.clone(), post.body.clone())))
        .collect()
}
