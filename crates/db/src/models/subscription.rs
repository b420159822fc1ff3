//! Twitter subscription entity.

use serde::Serialize;
use sqlx::FromRow;
use tothc_core::types::{DbId, Timestamp, TweetId, TwitterUserId};

/// A row from the `twitter_subscriptions` table.
///
/// Rows are never deleted; unsubscribing stamps `unsubscribed_at`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TwitterSubscription {
    pub id: DbId,
    pub user_id: TwitterUserId,
    pub screen_name: String,
    pub subscribed_at: Timestamp,
    pub unsubscribed_at: Option<Timestamp>,
    /// Newest tweet already handled. `None` until the first poll.
    pub latest_tweet_id: Option<TweetId>,
    pub refreshed_latest_tweet_id_at: Option<Timestamp>,
}

impl TwitterSubscription {
    pub fn is_active(&self) -> bool {
        self.unsubscribed_at.is_none()
    }
}

/// Result of [`SubscriptionRepo::subscribe`](crate::repositories::SubscriptionRepo::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    Reactivated,
    AlreadyActive,
}
