//! Seams between the relay runtime and the outside world.
//!
//! [`TothcBot`](crate::bot::TothcBot) only talks to Twitter and Slack
//! through these traits; the production implementations forward to the
//! HTTP clients.

use async_trait::async_trait;
use tothc_core::tweet::{Timeline, TwitterUser};
use tothc_core::types::{TweetId, TwitterUserId};
use tothc_slack::{SlackClient, SlackError};
use tothc_twitter::{TwitterClient, TwitterError};

/// Where tweets come from.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    async fn lookup_user(&self, screen_name: &str) -> Result<TwitterUser, TwitterError>;

    async fn user_timeline(
        &self,
        user_id: TwitterUserId,
        since_id: Option<TweetId>,
    ) -> Result<Timeline, TwitterError>;
}

/// Where relayed tweets go.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError>;
}

#[async_trait]
impl TimelineSource for TwitterClient {
    async fn lookup_user(&self, screen_name: &str) -> Result<TwitterUser, TwitterError> {
        self.get_user_by_screen_name(screen_name).await
    }

    async fn user_timeline(
        &self,
        user_id: TwitterUserId,
        since_id: Option<TweetId>,
    ) -> Result<Timeline, TwitterError> {
        self.get_user_timeline_by_user_id(user_id, since_id).await
    }
}

#[async_trait]
impl MessageSink for SlackClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        SlackClient::post_message(self, channel, text).await?;
        Ok(())
    }
}
