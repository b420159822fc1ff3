//! Slack Web API client used to publish relayed tweets.

pub mod client;

pub use client::{
    PostMessageResponse, RetryPolicy, SlackClient, SlackError, DEFAULT_API_URL, MAX_RETRY_AFTER,
};
