//! Selection of tweets to relay into Slack.
//!
//! [`plan_relay`] turns a freshly fetched [`Timeline`] into an ordered list
//! of [`RelayItem`]s. Ordering is oldest first so the channel reads
//! chronologically, and content already posted recently (the same tweet
//! retweeted by several watched accounts) is skipped.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::tweet::{Timeline, Tweet};
use crate::types::TweetId;

/// How many content URLs [`RecentlyRelayed`] remembers by default.
pub const DEFAULT_RECENT_CAPACITY: usize = 1000;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayFilter {
    /// Relay every tweet.
    All,
    /// Relay only tweets carrying photos, videos or GIFs.
    #[default]
    MediaOnly,
}

impl FromStr for RelayFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "media" | "media_only" | "media-only" => Ok(Self::MediaOnly),
            other => Err(CoreError::Validation(format!(
                "unknown relay filter {other:?} (expected \"all\" or \"media\")"
            ))),
        }
    }
}

impl fmt::Display for RelayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::MediaOnly => f.write_str("media"),
        }
    }
}

/// Which tweets of a timeline qualify for relaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayPolicy {
    pub filter: RelayFilter,
    pub include_retweets: bool,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            filter: RelayFilter::MediaOnly,
            include_retweets: true,
        }
    }
}

impl RelayPolicy {
    pub fn accepts(&self, tweet: &Tweet) -> bool {
        if tweet.is_retweet() && !self.include_retweets {
            return false;
        }
        match self.filter {
            RelayFilter::All => true,
            RelayFilter::MediaOnly => tweet.has_media() || tweet.content().has_media(),
        }
    }
}

// ---------------------------------------------------------------------------
// De-duplication
// ---------------------------------------------------------------------------

/// Bounded FIFO set of content URLs that were already posted.
#[derive(Debug)]
pub struct RecentlyRelayed {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentlyRelayed {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Remember `url`. Returns `false` if it was already present.
    ///
    /// The oldest entry is evicted once the set is full.
    pub fn insert(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        self.order.push_back(url.to_string());
        self.seen.insert(url.to_string());
        true
    }

    /// Forget `url`, e.g. after a failed post so it can be retried.
    pub fn remove(&mut self, url: &str) {
        if self.seen.remove(url) {
            self.order.retain(|u| u != url);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for RecentlyRelayed {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECENT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// A single message to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayItem {
    /// Id of the timeline entry (the retweet, not the original, for retweets).
    pub tweet_id: TweetId,
    pub url: String,
}

/// Pick the tweets of `timeline` to post, oldest first.
///
/// Every returned URL is recorded in `recent`.
pub fn plan_relay(
    timeline: &Timeline,
    policy: &RelayPolicy,
    recent: &mut RecentlyRelayed,
) -> Vec<RelayItem> {
    timeline
        .oldest_first()
        .into_iter()
        .filter(|tweet| policy.accepts(tweet))
        .filter_map(|tweet| {
            let url = tweet.url_of_content();
            recent.insert(&url).then_some(RelayItem {
                tweet_id: tweet.id,
                url,
            })
        })
        .collect()
}

/// Slack message text for an item. Slack unfurls the link itself.
pub fn format_message(item: &RelayItem) -> String {
    item.url.clone()
}
