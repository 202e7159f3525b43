pub mod api;
pub mod auth;
pub mod rate_limiter;
pub mod retry;
pub mod scraper;


pub use api::{RedditApiClient, RedditListing, RedditPostData};
pub use auth::{AuthState, RedditAuthenticator, RedditToken};
pub use retry::{RetryConfig, RetryExecutor};
pub use scraper::{mentions_any, PostSource, SubredditScraper, DEFAULT_FETCH_LIMIT};

use async_trait::async_trait;
use painpoint_core::{CoreError, RedditApiError, RedditCredentials};
use rate_limiter::RateLimitStatus;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Authenticated, rate-limited access to subreddit listings.
#[derive(Debug)]
pub struct RedditClient {
    authenticator: RedditAuthenticator,
    api: RedditApiClient,
    retry: RetryExecutor,
    auth_state: Mutex<AuthState>,
}

impl RedditClient {
    pub fn new(credentials: &RedditCredentials) -> Result<Self, CoreError> {
        Ok(Self {
            authenticator: RedditAuthenticator::new(credentials)?,
            api: RedditApiClient::new(&credentials.user_agent)?,
            retry: RetryExecutor::new(RetryConfig::reddit()),
            auth_state: Mutex::new(AuthState::NotAuthenticated),
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.auth_state.lock().await.valid_token().is_some()
    }

    pub async fn auth_state(&self) -> AuthState {
        self.auth_state.lock().await.clone()
    }

    pub async fn set_token(&self, token: RedditToken) {
        *self.auth_state.lock().await = AuthState::from_token(token);
    }

    /// Fetches a token now, so bad credentials surface before any scraping.
    pub async fn authenticate(&self) -> Result<(), CoreError> {
        self.access_token().await.map(|_| ())
    }

    /// The cached token, or a fresh one when none is held or it expired.
    async fn access_token(&self) -> Result<String, CoreError> {
        let mut state = self.auth_state.lock().await;
        if let Some(token) = state.valid_token() {
            return Ok(token.to_string());
        }

        if let AuthState::TokenExpired { expired_at } = &*state {
            debug!("Reddit token expired at {:?}, refreshing", expired_at);
        }
        let token = self.authenticator.request_token().await?;
        let access_token = token.access_token.clone();
        *state = AuthState::Authenticated { token };
        info!("Authenticated with Reddit");
        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        let mut state = self.auth_state.lock().await;
        if let AuthState::Authenticated { token } = &*state {
            *state = AuthState::TokenExpired {
                expired_at: token.expires_at,
            };
        }
    }

    pub async fn rate_limit_status(&self) -> RateLimitStatus {
        self.api.rate_limit_status().await
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_hot(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        let operation_name = format!("fetch r/{}", subreddit);
        self.retry
            .execute(&operation_name, move || async move {
                let token = self.access_token().await?;
                let result = self.api.get_hot_posts(&token, subreddit, limit).await;
                if let Err(CoreError::RedditApi(RedditApiError::InvalidToken)) = &result {
                    self.invalidate_token().await;
                }
                result
            })
            .await
    }
}
