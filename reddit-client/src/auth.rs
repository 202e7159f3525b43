//! App-only OAuth2 for the Reddit API (client credentials grant).

use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError, Scope,
    TokenResponse, TokenUrl,
};
use painpoint_core::{ConfigError, CoreError, RedditApiError, RedditCredentials};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// A token is treated as expired this long before Reddit says it is.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

impl std::fmt::Debug for RedditToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum AuthState {
    NotAuthenticated,
    Authenticated { token: RedditToken },
    TokenExpired { expired_at: SystemTime },
}

impl AuthState {
    pub fn from_token(token: RedditToken) -> Self {
        if token.is_expired() {
            AuthState::TokenExpired {
                expired_at: token.expires_at,
            }
        } else {
            AuthState::Authenticated { token }
        }
    }

    /// The access token, if one is held and still valid.
    pub fn valid_token(&self) -> Option<&str> {
        match self {
            AuthState::Authenticated { token } if !token.is_expired() => {
                Some(token.access_token.as_str())
            }
            _ => None,
        }
    }
}

/// Exchanges the app's credentials for bearer tokens.
#[derive(Debug)]
pub struct RedditAuthenticator {
    oauth_client: BasicClient,
    http_client: reqwest::Client,
}

impl RedditAuthenticator {
    pub fn new(credentials: &RedditCredentials) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| invalid_url("auth_url", e))?;
        let token_url =
            TokenUrl::new(REDDIT_TOKEN_URL.to_string()).map_err(|e| invalid_url("token_url", e))?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        // Reddit rejects requests without a descriptive User-Agent, so the
        // token exchange goes through our own client instead of oauth2's.
        let http_client = reqwest::Client::builder()
            .user_agent(credentials.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            oauth_client,
            http_client,
        })
    }

    pub async fn request_token(&self) -> Result<RedditToken, CoreError> {
        debug!("Requesting application-only Reddit token");
        let http_client = self.http_client.clone();
        let response = self
            .oauth_client
            .exchange_client_credentials()
            .add_scope(Scope::new("read".to_string()))
            .request_async(move |request| send_token_request(http_client, request))
            .await
            .map_err(map_token_error)?;

        let token = token_from_response(&response, SystemTime::now());
        info!("Obtained Reddit access token with scope {:?}", token.scope);
        Ok(token)
    }
}

fn invalid_url(field: &str, error: url::ParseError) -> CoreError {
    CoreError::Config(ConfigError::InvalidValue {
        field: field.to_string(),
        value: error.to_string(),
    })
}

async fn send_token_request(
    client: reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn map_token_error<RE>(error: RequestTokenError<reqwest::Error, RE>) -> CoreError
where
    RE: oauth2::ErrorResponse + std::fmt::Display + 'static,
{
    match error {
        RequestTokenError::ServerResponse(response) => {
            CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: response.to_string(),
            })
        }
        RequestTokenError::Request(e) if e.is_timeout() => {
            CoreError::RedditApi(RedditApiError::RequestTimeout)
        }
        RequestTokenError::Request(e) => CoreError::Network(e),
        // Reddit answers bad credentials with a non-OAuth JSON body.
        RequestTokenError::Parse(e, _) => CoreError::RedditApi(RedditApiError::AuthenticationFailed {
            reason: format!("unexpected token response: {}", e),
        }),
        RequestTokenError::Other(reason) => {
            CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
        }
    }
}

pub(crate) fn token_from_response(response: &BasicTokenResponse, now: SystemTime) -> RedditToken {
    let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
    let scope = response
        .scopes()
        .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default();

    RedditToken {
        access_token: response.access_token().secret().clone(),
        expires_at: now + lifetime,
        scope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: Duration) -> RedditToken {
        RedditToken {
            access_token: "abc".to_string(),
            expires_at: SystemTime::now() + expires_in,
            scope: vec!["read".to_string()],
        }
    }

    #[test]
    fn test_token_expiry_uses_margin() {
        assert!(!token(Duration::from_secs(3600)).is_expired());
        assert!(token(Duration::from_secs(30)).is_expired());
    }

    #[test]
    fn test_auth_state_from_token() {
        let state = AuthState::from_token(token(Duration::from_secs(3600)));
        assert_eq!(state.valid_token(), Some("abc"));

        let expired = AuthState::from_token(token(Duration::from_secs(0)));
        assert!(matches!(expired, AuthState::TokenExpired { .. }));
        assert_eq!(expired.valid_token(), None);
        assert_eq!(AuthState::NotAuthenticated.valid_token(), None);
    }

    #[test]
    fn test_token_debug_hides_secret() {
        let rendered = format!("{:?}", token(Duration::from_secs(3600)));
        assert!(!rendered.contains("abc"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_token_from_response() {
        let response: BasicTokenResponse = serde_json::from_str(
            r#"{"access_token":"tok","token_type":"bearer","expires_in":86400,"scope":"read"}"#,
        )
        .unwrap();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let token = token_from_response(&response, now);

        assert_eq!(token.access_token, "tok");
        assert_eq!(token.expires_at, now + Duration::from_secs(86400));
        assert_eq!(token.scope, vec!["read".to_string()]);
    }

    #[test]
    fn test_token_serialization() {
        let original = RedditToken {
            access_token: "test_access_token".to_string(),
            expires_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1640995200),
            scope: vec!["read".to_string()],
        };

        let serialized = serde_json::to_string(&original).unwrap();
        assert!(serialized.contains("test_access_token"));

        let deserialized: RedditToken = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.access_token, original.access_token);
        assert_eq!(deserialized.expires_at, original.expires_at);
        assert_eq!(deserialized.scope, original.scope);
    }

    #[test]
    fn test_authenticator_builds_from_credentials() {
        let credentials = RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "painpoint/0.1 by tester".to_string(),
        };
        assert!(RedditAuthenticator::new(&credentials).is_ok());
    }
}
