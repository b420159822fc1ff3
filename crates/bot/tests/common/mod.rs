//! In-process fakes for the Twitter and Slack seams.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tothc_bot::{BotSettings, MessageSink, TimelineSource};
use tothc_core::relay::RelayPolicy;
use tothc_core::tweet::{Timeline, Tweet, TwitterUser};
use tothc_core::types::{TweetId, TwitterUserId};
use tothc_db::DbPool;
use tothc_slack::SlackError;
use tothc_twitter::TwitterError;

pub async fn pool() -> DbPool {
    let pool = tothc_db::create_in_memory_pool().await.unwrap();
    tothc_db::run_migrations(&pool).await.unwrap();
    pool
}

pub fn settings(policy: RelayPolicy) -> BotSettings {
    BotSettings {
        slack_channel: "#relay".into(),
        poll_interval: Duration::from_millis(10),
        policy,
    }
}

/// A tweet by `user_id`/`screen_name`, with or without a photo.
pub fn tweet(id: TweetId, user_id: TwitterUserId, screen_name: &str, media: bool) -> Tweet {
    let media = if media { json!([{ "id": id, "type": "photo" }]) } else { json!([]) };
    serde_json::from_value(json!({
        "id": id,
        "full_text": format!("tweet {id}"),
        "user": { "id": user_id, "screen_name": screen_name },
        "entities": { "media": media },
    }))
    .unwrap()
}

/// A retweet by `user_id` of `original_id` from `author`.
pub fn retweet(
    id: TweetId,
    user_id: TwitterUserId,
    screen_name: &str,
    original_id: TweetId,
    author: &str,
) -> Tweet {
    serde_json::from_value(json!({
        "id": id,
        "user": { "id": user_id, "screen_name": screen_name },
        "retweeted_status": {
            "id": original_id,
            "user": { "id": 999, "screen_name": author },
            "entities": { "media": [{ "id": original_id }] },
        },
    }))
    .unwrap()
}

pub fn url(screen_name: &str, id: TweetId) -> String {
    format!("https://www.twitter.com/{screen_name}/status/{id}")
}

// ---------------------------------------------------------------------------
// FakeTwitter
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TwitterState {
    users: HashMap<String, TwitterUser>,
    tweets: HashMap<TwitterUserId, Vec<Tweet>>,
    unavailable: HashSet<TwitterUserId>,
    rate_limited: bool,
    credentials_rejected: bool,
    timeline_calls: Vec<(TwitterUserId, Option<TweetId>)>,
}

/// Serves timelines from memory, newest first, honoring `since_id`.
#[derive(Clone, Default)]
pub struct FakeTwitter {
    state: Arc<Mutex<TwitterState>>,
}

impl FakeTwitter {
    pub fn add_user(&self, id: TwitterUserId, screen_name: &str) {
        self.state.lock().unwrap().users.insert(
            screen_name.to_ascii_lowercase(),
            TwitterUser {
                id,
                screen_name: screen_name.to_string(),
                name: screen_name.to_string(),
                protected: false,
            },
        );
    }

    pub fn push(&self, tweet: Tweet) {
        let mut state = self.state.lock().unwrap();
        state.tweets.entry(tweet.user.id).or_default().push(tweet);
    }

    pub fn make_unavailable(&self, user_id: TwitterUserId) {
        self.state.lock().unwrap().unavailable.insert(user_id);
    }

    pub fn set_rate_limited(&self, limited: bool) {
        self.state.lock().unwrap().rate_limited = limited;
    }

    pub fn reject_credentials(&self) {
        self.state.lock().unwrap().credentials_rejected = true;
    }

    pub fn timeline_calls(&self) -> Vec<(TwitterUserId, Option<TweetId>)> {
        self.state.lock().unwrap().timeline_calls.clone()
    }
}

#[async_trait]
impl TimelineSource for FakeTwitter {
    async fn lookup_user(&self, screen_name: &str) -> Result<TwitterUser, TwitterError> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&screen_name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| TwitterError::UserNotFound {
                screen_name: screen_name.to_string(),
            })
    }

    async fn user_timeline(
        &self,
        user_id: TwitterUserId,
        since_id: Option<TweetId>,
    ) -> Result<Timeline, TwitterError> {
        let mut state = self.state.lock().unwrap();
        state.timeline_calls.push((user_id, since_id));

        if state.rate_limited {
            return Err(TwitterError::RateLimited { reset_at: None });
        }
        if state.credentials_rejected {
            return Err(TwitterError::Unauthorized { code: 89 });
        }
        if state.unavailable.contains(&user_id) {
            return Err(TwitterError::TimelineUnavailable {
                user_id,
                status: 401,
            });
        }

        let mut tweets: Vec<Tweet> = state
            .tweets
            .get(&user_id)
            .map(|all| {
                all.iter()
                    .filter(|t| since_id.map_or(true, |since| t.id > since))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        tweets.sort_by_key(|t| std::cmp::Reverse(t.id));
        Ok(Timeline::new(tweets))
    }
}

// ---------------------------------------------------------------------------
// FakeSlack
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SlackState {
    posted: Vec<(String, String)>,
    failing: HashSet<String>,
}

/// Records posted messages; texts registered with [`FakeSlack::fail_on`]
/// are refused.
#[derive(Clone, Default)]
pub struct FakeSlack {
    state: Arc<Mutex<SlackState>>,
}

impl FakeSlack {
    pub fn fail_on(&self, text: &str) {
        self.state.lock().unwrap().failing.insert(text.to_string());
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    pub fn posted_texts(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .posted
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn channels(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .posted
            .iter()
            .map(|(channel, _)| channel.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSink for FakeSlack {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let mut state = self.state.lock().unwrap();
        if state.failing.contains(text) {
            return Err(SlackError::Api {
                error: "fatal_error".into(),
            });
        }
        state.posted.push((channel.to_string(), text.to_string()));
        Ok(())
    }
}
