//! `chat.postMessage` delivery with exponential-backoff retry.
//!
//! [`SlackClient`] posts a message as the bot user. Transport failures,
//! HTTP 5xx and rate limiting (HTTP 429) are retried; Slack's logical
//! errors (`{"ok": false, "error": "channel_not_found"}`) are not, since
//! repeating the request would fail the same way.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Emoji shown as the bot's avatar.
const ICON_EMOJI: &str = "robot_face";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Slack returned a non-2xx status code.
    #[error("Slack returned HTTP {status}")]
    HttpStatus {
        status: u16,
        /// Seconds from a `Retry-After` header, if any.
        retry_after: Option<u64>,
    },

    /// Slack accepted the request but refused it (`ok: false`).
    #[error("Slack API error: {error}")]
    Api { error: String },
}

impl SlackError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::HttpStatus { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            Self::Api { .. } => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    icon_emoji: &'a str,
}

/// Body of a `chat.postMessage` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp, Slack's id for the posted message.
    #[serde(default)]
    pub ts: Option<String>,
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Longest wait a `Retry-After` header can impose before the next attempt.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Delays between delivery attempts. One attempt is made per delay plus a
/// final one.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub delays: Vec<Duration>,
    /// Upper bound on a server-requested `Retry-After` wait.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    /// Exponential backoff: 1 s, 2 s, 4 s.
    fn default() -> Self {
        Self {
            delays: [1, 2, 4].into_iter().map(Duration::from_secs).collect(),
            max_wait: MAX_RETRY_AFTER,
        }
    }
}

impl RetryPolicy {
    /// No retries; a single attempt.
    pub fn none() -> Self {
        Self {
            delays: Vec::new(),
            max_wait: MAX_RETRY_AFTER,
        }
    }

    /// How long to wait after `err` before the next attempt: the server's
    /// `Retry-After` capped at `max_wait`, otherwise `delay`.
    fn wait_after(&self, err: &SlackError, delay: Duration) -> Duration {
        match err {
            SlackError::HttpStatus {
                retry_after: Some(secs),
                ..
            } => Duration::from_secs(*secs).min(self.max_wait),
            _ => delay,
        }
    }
}

// ---------------------------------------------------------------------------
// SlackClient
// ---------------------------------------------------------------------------

pub struct SlackClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
    retry: RetryPolicy,
}

impl SlackClient {
    /// Create a client for the production API with the default retry policy.
    pub fn new(token: String) -> Result<Self, SlackError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, DEFAULT_API_URL.to_string(), token))
    }

    /// Create a client reusing an existing [`reqwest::Client`] and base URL.
    pub fn with_client(client: reqwest::Client, api_url: String, token: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Post `text` to `channel` (a name like `#general` or a channel id).
    ///
    /// Retries per the configured [`RetryPolicy`] before giving up.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
    ) -> Result<PostMessageResponse, SlackError> {
        let request = PostMessageRequest {
            channel,
            text,
            icon_emoji: ICON_EMOJI,
        };

        for (attempt, delay) in self.retry.delays.iter().enumerate() {
            match self.try_post(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() => {
                    let wait = self.retry.wait_after(&e, *delay);
                    tracing::warn!(
                        attempt = attempt + 1,
                        channel,
                        error = %e,
                        wait_ms = wait.as_millis() as u64,
                        "Slack delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    tracing::error!(channel, error = %e, "Slack rejected message");
                    return Err(e);
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_post(&request).await.inspect_err(|e| {
            tracing::error!(channel, error = %e, "Slack delivery failed after all retries");
        })
    }

    /// Execute a single POST and check both the HTTP status and `ok` flag.
    async fn try_post(
        &self,
        request: &PostMessageRequest<'_>,
    ) -> Result<PostMessageResponse, SlackError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(SlackError::HttpStatus {
                status: status.as_u16(),
                retry_after,
            });
        }

        let body = response.json::<PostMessageResponse>().await?;
        if !body.ok {
            return Err(SlackError::Api {
                error: body.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
