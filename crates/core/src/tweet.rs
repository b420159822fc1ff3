//! Twitter API v1.1 payload types.
//!
//! Only the fields the relay needs are modelled; everything else in the
//! JSON is ignored on deserialization.

use serde::{Deserialize, Serialize};

use crate::types::{TweetId, TwitterUserId};

/// Base URL used when building links to tweets.
pub const TWEET_URL_BASE: &str = "https://www.twitter.com";

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A user object as returned by `users/show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterUser {
    pub id: TwitterUserId,
    pub screen_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}

/// The embedded `user` object of a tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetAuthor {
    pub id: TwitterUserId,
    pub screen_name: String,
}

// ---------------------------------------------------------------------------
// Tweets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    #[serde(default)]
    pub media_url_https: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub media: Vec<Media>,
}

/// A single status from a user timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Present when requested with `tweet_mode=extended`.
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub user: TweetAuthor,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub retweeted_status: Option<Box<Tweet>>,
}

impl Tweet {
    /// Whether this tweet itself carries media entities.
    pub fn has_media(&self) -> bool {
        !self.entities.media.is_empty()
    }

    pub fn is_retweet(&self) -> bool {
        self.retweeted_status.is_some()
    }

    /// The tweet that holds the actual content: the retweeted status for
    /// retweets, otherwise the tweet itself.
    pub fn content(&self) -> &Tweet {
        self.retweeted_status.as_deref().unwrap_or(self)
    }

    /// Either the URL of the tweet itself, or the URL of the tweet it is a
    /// retweet of.
    pub fn url_of_content(&self) -> String {
        let content = self.content();
        format!(
            "{TWEET_URL_BASE}/{}/status/{}",
            content.user.screen_name, content.id
        )
    }

    /// Tweet text, preferring the untruncated `full_text`.
    pub fn body(&self) -> &str {
        self.full_text
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Timelines
// ---------------------------------------------------------------------------

/// A page of `statuses/user_timeline`, newest tweet first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    pub tweets: Vec<Tweet>,
}

impl Timeline {
    pub fn new(tweets: Vec<Tweet>) -> Self {
        Self { tweets }
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    /// Highest tweet id in the page.
    pub fn newest_id(&self) -> Option<TweetId> {
        self.tweets.iter().map(|t| t.id).max()
    }

    /// Lowest tweet id in the page.
    pub fn oldest_id(&self) -> Option<TweetId> {
        self.tweets.iter().map(|t| t.id).min()
    }

    /// Tweets in ascending id order regardless of how the API ordered them.
    pub fn oldest_first(&self) -> Vec<&Tweet> {
        let mut tweets: Vec<&Tweet> = self.tweets.iter().collect();
        tweets.sort_by_key(|t| t.id);
        tweets
    }

    /// Current screen name of `user_id`, read from their newest tweet.
    ///
    /// Retweets still list the retweeting account as `user`, so every tweet
    /// in a user timeline qualifies.
    pub fn author_screen_name(&self, user_id: TwitterUserId) -> Option<&str> {
        self.tweets
            .iter()
            .filter(|t| t.user.id == user_id)
            .max_by_key(|t| t.id)
            .map(|t| t.user.screen_name.as_str())
    }
}
