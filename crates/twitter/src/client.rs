//! HTTP client for the Twitter endpoints the bot uses.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use tothc_core::tweet::{Timeline, TwitterUser};
use tothc_core::types::{TweetId, TwitterUserId};

use crate::error::TwitterError;
use crate::oauth::{self, OAuth10aTokens};

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com/1.1";

/// Largest page `statuses/user_timeline` will return.
pub const TIMELINE_PAGE_SIZE: u32 = 200;

/// Pages fetched per catch-up. The API serves at most the 3,200 most recent
/// tweets of an account, which is 16 full pages.
pub const MAX_TIMELINE_PAGES: usize = 16;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Twitter error codes meaning the account cannot be resolved
/// (50 = not found, 63 = suspended).
const UNRESOLVABLE_USER_CODES: [i64; 2] = [50, 63];

/// Twitter error codes meaning the app credentials were refused (32 = could
/// not authenticate, 89 = invalid or expired token, 135 = timestamp out of
/// bounds, 215 = bad authentication data).
const AUTH_ERROR_CODES: [i64; 4] = [32, 89, 135, 215];

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    code: i64,
}

/// Signed client for a single set of app credentials.
pub struct TwitterClient {
    client: reqwest::Client,
    api_url: String,
    tokens: OAuth10aTokens,
}

impl TwitterClient {
    /// Create a client against the production API.
    pub fn new(tokens: OAuth10aTokens) -> Result<Self, TwitterError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, DEFAULT_API_URL.to_string(), tokens))
    }

    /// Create a client reusing an existing [`reqwest::Client`] and base URL
    /// (e.g. a mock server in tests).
    pub fn with_client(client: reqwest::Client, api_url: String, tokens: OAuth10aTokens) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Look up an account by handle (`GET users/show.json`).
    pub async fn get_user_by_screen_name(
        &self,
        screen_name: &str,
    ) -> Result<TwitterUser, TwitterError> {
        let params = [("screen_name", screen_name.to_string())];
        let response = self.signed_get("users/show.json", &params).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TwitterError::UserNotFound {
                screen_name: screen_name.to_string(),
            });
        }
        if status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            if find_error_code(&body, &UNRESOLVABLE_USER_CODES).is_some() {
                return Err(TwitterError::UserNotFound {
                    screen_name: screen_name.to_string(),
                });
            }
            return Err(TwitterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_response(response).await
    }

    /// Fetch the recent tweets of an account, retweets included.
    ///
    /// Without `since_id` only the newest page is fetched. With it, older
    /// pages are requested with `max_id` until a short page shows the gap
    /// to `since_id` is closed, up to [`MAX_TIMELINE_PAGES`].
    pub async fn get_user_timeline_by_user_id(
        &self,
        user_id: TwitterUserId,
        since_id: Option<TweetId>,
    ) -> Result<Timeline, TwitterError> {
        let mut timeline = self.get_timeline_page(user_id, since_id, None).await?;
        let Some(since_id) = since_id else {
            return Ok(timeline);
        };

        let mut last_page_len = timeline.len();
        let mut pages = 1;
        while last_page_len >= TIMELINE_PAGE_SIZE as usize {
            if pages == MAX_TIMELINE_PAGES {
                tracing::warn!(
                    user_id,
                    since_id,
                    fetched = timeline.len(),
                    "Timeline page limit reached, older tweets are skipped"
                );
                break;
            }
            let Some(oldest) = timeline.oldest_id() else {
                break;
            };

            let page = self
                .get_timeline_page(user_id, Some(since_id), Some(oldest - 1))
                .await?;
            last_page_len = page.len();
            pages += 1;
            timeline.tweets.extend(page.tweets);
        }

        if pages > 1 {
            tracing::info!(user_id, pages, fetched = timeline.len(), "Caught up on timeline");
        }
        Ok(timeline)
    }

    // ---- private helpers ----

    /// One `statuses/user_timeline` request of up to [`TIMELINE_PAGE_SIZE`]
    /// tweets.
    async fn get_timeline_page(
        &self,
        user_id: TwitterUserId,
        since_id: Option<TweetId>,
        max_id: Option<TweetId>,
    ) -> Result<Timeline, TwitterError> {
        let mut params = vec![
            ("user_id", user_id.to_string()),
            ("count", TIMELINE_PAGE_SIZE.to_string()),
            ("include_rts", "true".to_string()),
            ("tweet_mode", "extended".to_string()),
        ];
        if let Some(since_id) = since_id {
            params.push(("since_id", since_id.to_string()));
        }
        if let Some(max_id) = max_id {
            params.push(("max_id", max_id.to_string()));
        }

        tracing::debug!(user_id, ?since_id, ?max_id, "Fetching user timeline");
        let response = self
            .signed_get("statuses/user_timeline.json", &params)
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Protected timelines answer 401 as well, without an auth code.
            let body = response.text().await.unwrap_or_default();
            if let Some(code) = find_error_code(&body, &AUTH_ERROR_CODES) {
                return Err(TwitterError::Unauthorized { code });
            }
            return Err(TwitterError::TimelineUnavailable {
                user_id,
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(TwitterError::TimelineUnavailable {
                user_id,
                status: status.as_u16(),
            });
        }

        Self::parse_response(response).await
    }

    async fn signed_get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, TwitterError> {
        let url = format!("{}/{}", self.api_url, path);
        let authorization = oauth::authorization_header("GET", &url, params, &self.tokens);

        let response = self
            .client
            .get(&url)
            .query(params)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let reset_at = response
                .headers()
                .get("x-rate-limit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            tracing::warn!(path, ?reset_at, "Twitter rate limit hit");
            return Err(TwitterError::RateLimited { reset_at });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type, or
    /// turn a non-2xx status into [`TwitterError::Api`].
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TwitterError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            if status == StatusCode::UNAUTHORIZED {
                if let Some(code) = find_error_code(&body, &AUTH_ERROR_CODES) {
                    return Err(TwitterError::Unauthorized { code });
                }
            }
            return Err(TwitterError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// First error code in a Twitter error body that is one of `codes`.
fn find_error_code(body: &str, codes: &[i64]) -> Option<i64> {
    let body = serde_json::from_str::<ErrorBody>(body).ok()?;
    body.errors
        .iter()
        .map(|e| e.code)
        .find(|code| codes.contains(code))
}
