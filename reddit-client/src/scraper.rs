use crate::api::RedditPostData;
use async_trait::async_trait;
use painpoint_core::{
    CoreError, ErrorExt, ErrorReporter, FetchStatus, NormalizedText, PainKeywords, ScrapeManifest,
    SourceOutcome,
};
use tracing::{info, warn};

pub const DEFAULT_FETCH_LIMIT: u32 = 100;

/// Anything that can list a subreddit's hot posts.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_hot(&self, subreddit: &str, limit: u32)
        -> Result<Vec<RedditPostData>, CoreError>;
}

/// True when any keyword occurs in the normalized title or selftext. Both
/// sides go through the same normalizer, so this never rejects a post the
/// tagger would accept.
pub fn mentions_any(post: &RedditPostData, keywords: &PainKeywords) -> bool {
    let title = NormalizedText::normalize(&post.title);
    let body = NormalizedText::normalize(&post.selftext);
    keywords
        .iter()
        .any(|keyword| title.contains(keyword) || body.contains(keyword))
}

/// The most specific code available, so the manifest can tell a missing
/// subreddit from a rate limit.
fn failure_code(error: &CoreError) -> String {
    match error {
        CoreError::RedditApi(api_error) => api_error.error_code(),
        other => other.error_code(),
    }
}

/// Fetches subreddits one at a time and keeps the posts that mention a pain
/// point keyword.
pub struct SubredditScraper<S> {
    source: S,
    reporter: ErrorReporter,
}

impl<S: PostSource> SubredditScraper<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            reporter: ErrorReporter::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// A failing subreddit is recorded in the manifest and skipped; it never
    /// aborts the run.
    pub async fn scrape(
        &self,
        subreddits: &[String],
        keywords: &PainKeywords,
        limit: u32,
    ) -> ScrapeManifest {
        let mut manifest = ScrapeManifest::default();

        for subreddit in subreddits {
            info!("Scraping r/{}...", subreddit);
            let status = match self.source.fetch_hot(subreddit, limit).await {
                Ok(posts) => {
                    let fetched = posts.len();
                    let before = manifest.posts.len();
                    manifest.posts.extend(
                        posts
                            .into_iter()
                            .filter(|post| mentions_any(post, keywords))
                            .map(|post| post.into_raw_post(subreddit)),
                    );
                    let matched = manifest.posts.len() - before;
                    info!(
                        "r/{}: {} of {} posts mention a pain point",
                        subreddit, matched, fetched
                    );
                    FetchStatus::Fetched { fetched, matched }
                }
                Err(error) => {
                    warn!("Error scraping r/{}: {}", subreddit, error);
                    self.reporter.report_warning(&error);
                    FetchStatus::Failed {
                        reason: error.to_string(),
                        error_code: failure_code(&error),
                    }
                }
            };

            manifest.outcomes.push(SourceOutcome {
                subreddit: subreddit.clone(),
                status,
            });
        }

        let failed = manifest.failed().count();
        if failed > 0 {
            warn!(
                "{} of {} subreddits could not be fetched",
                failed,
                manifest.outcomes.len()
            );
        }
        info!(
            "Scraping complete. {} posts found.",
            manifest.posts.len()
        );
        manifest
    }
}
