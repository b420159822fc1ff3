use tothc_core::types::TwitterUserId;

/// Errors from the Twitter REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum TwitterError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("User not found: {screen_name}")]
    UserNotFound { screen_name: String },

    /// Protected, suspended or deleted account.
    #[error("Timeline of user {user_id} is unavailable (HTTP {status})")]
    TimelineUnavailable { user_id: TwitterUserId, status: u16 },

    /// The app credentials were refused (revoked, expired or malformed
    /// tokens). Affects every request, not a single account.
    #[error("Twitter rejected the credentials (error code {code})")]
    Unauthorized { code: i64 },

    /// `reset_at` is the unix time the rate-limit window reopens.
    #[error("Rate limited by Twitter (resets at {reset_at:?})")]
    RateLimited { reset_at: Option<i64> },

    #[error("Twitter API error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl TwitterError {
    /// Whether the error concerns a single account rather than the API as a
    /// whole, so the caller can carry on with other accounts.
    pub fn is_account_specific(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. } | Self::TimelineUnavailable { .. }
        )
    }
}
