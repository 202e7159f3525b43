use crate::rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};
use chrono::{DateTime, Utc};
use painpoint_core::{CoreError, RawPost, RedditApiError};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Reddit never returns more than this many posts per listing page.
pub const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

/// The fields of a listing post this crate uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default = "deleted_author")]
    pub author: String,
    pub subreddit: String,
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u64,
    #[serde(default)]
    pub stickied: bool,
}

fn deleted_author() -> String {
    "[deleted]".to_string()
}

impl RedditPostData {
    /// Converts to a pipeline record. `subreddit` is the name the post was
    /// fetched under, which keeps the configured spelling in the output.
    pub fn into_raw_post(self, subreddit: &str) -> RawPost {
        let seconds = self.created_utc.trunc() as i64;
        let nanos = (self.created_utc.fract() * 1e9) as u32;

        RawPost {
            subreddit: subreddit.to_string(),
            title: Some(self.title),
            body: Some(self.selftext),
            author: self.author,
            created_utc: DateTime::<Utc>::from_timestamp(seconds, nanos).unwrap_or_default(),
            upvotes: self.score,
            num_comments: self.num_comments,
            url: self.url,
        }
    }
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(user_agent: &str) -> Result<Self, CoreError> {
        Self::with_base_url(user_agent, REDDIT_API_BASE)
    }

    pub fn with_base_url(user_agent: &str, base_url: &str) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(RateLimitConfig::reddit_oauth()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn make_request(
        &self,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, String)],
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let permit = self.rate_limiter.acquire_permit().await?;
        debug!(
            "Acquired rate limit permit for GET {} after {:?}",
            endpoint, permit.queue_wait_time
        );

        debug!("Making Reddit API request: GET {}", endpoint);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(query_params)
            .send()
            .await
            .map_err(|e| {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    CoreError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if let Some(api_error) = classify_status(status, response.headers(), endpoint) {
            error!("Request failed with status {} for {}", status, endpoint);
            return Err(api_error.into());
        }

        debug!("Request successful: {} {}", status, endpoint);
        Ok(response)
    }

    /// One page of `/r/{subreddit}/hot`.
    pub async fn get_hot_page(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/hot", subreddit);
        let mut params = vec![
            ("limit", limit.min(MAX_PAGE_SIZE).to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(after) = after {
            params.push(("after", after.to_string()));
        }

        let response = self
            .make_request(&endpoint, access_token, &params)
            .await
            .map_err(|e| match e {
                // A 404 or redirect on a listing means the subreddit is missing.
                CoreError::RedditApi(RedditApiError::SubredditNotFound { .. }) => {
                    CoreError::RedditApi(RedditApiError::SubredditNotFound {
                        subreddit: subreddit.to_string(),
                    })
                }
                other => other,
            })?;

        let body = response.text().await?;
        let listing = parse_listing(&body).map_err(|details| {
            error!("Failed to parse posts for r/{}: {}", subreddit, details);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}: {}", subreddit, details),
            })
        })?;

        debug!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Up to `limit` hot posts, following `after` cursors across pages.
    pub async fn get_hot_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        let mut posts: Vec<RedditPostData> = Vec::new();
        let mut after: Option<String> = None;

        while (posts.len() as u32) < limit {
            let remaining = limit - posts.len() as u32;
            let listing = self
                .get_hot_page(access_token, subreddit, remaining, after.as_deref())
                .await?;

            let page_len = listing.data.children.len();
            posts.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .map(|child| child.data)
                    .take(remaining as usize),
            );

            match listing.data.after {
                Some(next) if page_len > 0 => after = Some(next),
                _ => break,
            }
        }

        info!("Retrieved {} posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }

    pub async fn rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.status().await
    }
}

/// Maps a non-success status to the matching API error.
pub fn classify_status(
    status: StatusCode,
    headers: &HeaderMap,
    endpoint: &str,
) -> Option<RedditApiError> {
    if status.is_success() {
        return None;
    }

    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = headers
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|seconds| seconds.ceil() as u64)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
        StatusCode::FORBIDDEN => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => RedditApiError::SubredditNotFound {
            subreddit: endpoint.to_string(),
        },
        s if s.is_server_error() => RedditApiError::ServerError {
            status_code: s.as_u16(),
        },
        s if s.is_redirection() => RedditApiError::SubredditNotFound {
            subreddit: endpoint.to_string(),
        },
        s => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", s, endpoint),
        },
    };
    Some(error)
}

pub fn parse_listing(body: &str) -> Result<RedditListing<RedditPostData>, String> {
    let listing: RedditListing<RedditPostData> =
        serde_json::from_str(body).map_err(|e| e.to_string())?;
    if listing.kind != "Listing" {
        return Err(format!("expected a Listing, got '{}'", listing.kind));
    }
    Ok(listing)
}
