//! Command-line interface.
//!
//! Every credential can also come from the environment (or a `.env` file
//! loaded with `dotenvy`), using the same variable names as the flags'
//! `env` attributes below.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tothc_core::relay::{RelayFilter, RelayPolicy};
use tothc_twitter::OAuth10aTokens;

use crate::bot::BotSettings;
use crate::error::BotError;

#[derive(Debug, Parser)]
#[command(
    name = "tothc-bot",
    version,
    about = "Relay tweets from watched Twitter accounts into a Slack channel"
)]
pub struct Cli {
    /// Where the SQLite DB file is. If it doesn't exist, a new file will be created.
    #[arg(long, env = "TOTHC_SQLITE_DB")]
    pub sqlite_db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the watched accounts and relay new tweets until interrupted.
    Run(RunArgs),
    /// Start watching a Twitter account.
    Subscribe(SubscribeArgs),
    /// Stop watching a Twitter account.
    Unsubscribe {
        /// Screen name as stored, with or without the leading `@`.
        screen_name: String,
    },
    /// Print the watched accounts.
    List {
        /// Include accounts that were unsubscribed.
        #[arg(long)]
        all: bool,
    },
}

/// OAuth 1.0a user-context credentials.
#[derive(Debug, Args)]
pub struct TwitterArgs {
    #[arg(long, env = "TWITTER_CONSUMER_KEY", hide_env_values = true)]
    pub twitter_consumer_key: String,

    #[arg(long, env = "TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    pub twitter_consumer_secret: String,

    #[arg(long, env = "TWITTER_ACCESS_TOKEN", hide_env_values = true)]
    pub twitter_access_token: String,

    #[arg(long, env = "TWITTER_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub twitter_access_token_secret: String,
}

impl TwitterArgs {
    pub fn tokens(&self) -> OAuth10aTokens {
        OAuth10aTokens {
            consumer_key: self.twitter_consumer_key.clone(),
            consumer_secret: self.twitter_consumer_secret.clone(),
            access_token: self.twitter_access_token.clone(),
            access_token_secret: self.twitter_access_token_secret.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub twitter: TwitterArgs,

    /// Slack bot token (`xoxb-...`).
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: String,

    /// The channel the tweets should be sent to.
    #[arg(long, env = "SLACK_CHANNEL")]
    pub slack_channel: String,

    /// Seconds between two polls of the watched accounts.
    #[arg(
        long,
        env = "POLL_INTERVAL_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    /// Which tweets to relay: `media` (photos, videos, GIFs) or `all`.
    #[arg(long, env = "RELAY_FILTER", default_value_t = RelayFilter::MediaOnly)]
    pub relay: RelayFilter,

    /// Skip retweets.
    #[arg(long)]
    pub no_retweets: bool,
}

impl RunArgs {
    pub fn settings(&self) -> Result<BotSettings, BotError> {
        let slack_channel = self.slack_channel.trim();
        if slack_channel.is_empty() || slack_channel == "#" {
            return Err(BotError::Config("Slack channel must not be empty".into()));
        }

        Ok(BotSettings {
            slack_channel: slack_channel.to_string(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            policy: RelayPolicy {
                filter: self.relay,
                include_retweets: !self.no_retweets,
            },
        })
    }
}

#[derive(Debug, Args)]
pub struct SubscribeArgs {
    #[command(flatten)]
    pub twitter: TwitterArgs,

    /// Screen name to watch, with or without the leading `@`.
    pub screen_name: String,
}
