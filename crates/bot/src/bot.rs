//! The relay loop.
//!
//! Every poll interval the bot walks the active subscriptions, fetches each
//! account's timeline since its stored high-water mark, posts the qualifying
//! tweets to Slack and advances the mark. A subscription without a mark is
//! primed instead: the mark is set to the newest tweet and nothing is
//! posted, so subscribing to an account does not dump its history into the
//! channel.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tothc_core::relay::{format_message, plan_relay, RecentlyRelayed, RelayPolicy};
use tothc_db::models::TwitterSubscription;
use tothc_db::repositories::SubscriptionRepo;
use tothc_db::DbPool;
use tothc_twitter::TwitterError;

use crate::error::BotError;
use crate::sources::{MessageSink, TimelineSource};

/// Default time between two poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Channel name (`#relay`) or id the tweets are posted to.
    pub slack_channel: String,
    pub poll_interval: Duration,
    pub policy: RelayPolicy,
}

/// Tally of one [`TothcBot::run_cycle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Subscriptions visited.
    pub accounts: usize,
    /// Messages posted to Slack.
    pub relayed: usize,
    /// Subscriptions that received their first high-water mark.
    pub primed: usize,
    /// Subscriptions that hit a Twitter, Slack or database error.
    pub failed: usize,
}

/// What polling a single subscription did.
enum PollOutcome {
    Primed,
    Relayed(usize),
}

pub struct TothcBot<S, M> {
    pool: DbPool,
    twitter: S,
    slack: M,
    settings: BotSettings,
    recent: RecentlyRelayed,
}

impl<S: TimelineSource, M: MessageSink> TothcBot<S, M> {
    pub fn new(pool: DbPool, twitter: S, slack: M, settings: BotSettings) -> Self {
        Self {
            pool,
            twitter,
            slack,
            settings,
            recent: RecentlyRelayed::default(),
        }
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Poll until `cancel` fires. The first cycle starts immediately.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            channel = %self.settings.slack_channel,
            interval_secs = self.settings.poll_interval.as_secs(),
            filter = %self.settings.policy.filter,
            include_retweets = self.settings.policy.include_retweets,
            "Relay bot started"
        );

        let mut interval = tokio::time::interval(self.settings.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Relay bot stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.run_cycle().await {
                        Ok(report) if report.relayed > 0 || report.failed > 0 => {
                            tracing::info!(?report, "Poll cycle finished");
                        }
                        Ok(report) => {
                            tracing::debug!(?report, "Poll cycle finished");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Poll cycle failed");
                        }
                    }
                }
            }
        }
    }

    /// Poll every active subscription once.
    ///
    /// Errors for a single account are logged and counted; only failing to
    /// list the subscriptions fails the cycle. A Twitter rate limit or
    /// rejected credentials end the cycle early.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, BotError> {
        let subscriptions = SubscriptionRepo::list_active(&self.pool).await?;
        let mut report = CycleReport::default();

        for subscription in &subscriptions {
            report.accounts += 1;
            match self.poll_subscription(subscription).await {
                Ok(PollOutcome::Primed) => report.primed += 1,
                Ok(PollOutcome::Relayed(n)) => report.relayed += n,
                Err(BotError::Twitter(e @ TwitterError::RateLimited { .. })) => {
                    report.failed += 1;
                    tracing::warn!(error = %e, "Rate limited, skipping the rest of this cycle");
                    break;
                }
                Err(BotError::Twitter(e @ TwitterError::Unauthorized { .. })) => {
                    report.failed += 1;
                    tracing::error!(
                        error = %e,
                        "Twitter credentials rejected, skipping the rest of this cycle"
                    );
                    break;
                }
                Err(BotError::Twitter(e)) if e.is_account_specific() => {
                    report.failed += 1;
                    tracing::warn!(
                        user_id = subscription.user_id,
                        screen_name = %subscription.screen_name,
                        error = %e,
                        "Account unavailable"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        user_id = subscription.user_id,
                        screen_name = %subscription.screen_name,
                        error = %e,
                        "Failed to poll subscription"
                    );
                }
            }
        }

        Ok(report)
    }

    async fn poll_subscription(
        &mut self,
        subscription: &TwitterSubscription,
    ) -> Result<PollOutcome, BotError> {
        let user_id = subscription.user_id;
        let timeline = self
            .twitter
            .user_timeline(user_id, subscription.latest_tweet_id)
            .await?;

        if let Some(current) = timeline.author_screen_name(user_id) {
            if current != subscription.screen_name {
                tracing::info!(
                    user_id,
                    old = %subscription.screen_name,
                    new = current,
                    "Screen name changed"
                );
                SubscriptionRepo::update_screen_name(&self.pool, user_id, current).await?;
            }
        }

        let Some(since_id) = subscription.latest_tweet_id else {
            if let Some(newest) = timeline.newest_id() {
                SubscriptionRepo::update_latest_tweet_id(&self.pool, user_id, newest).await?;
            }
            return Ok(PollOutcome::Primed);
        };

        let Some(newest) = timeline.newest_id() else {
            return Ok(PollOutcome::Relayed(0));
        };

        let items = plan_relay(&timeline, &self.settings.policy, &mut self.recent);
        let mut high_water = newest;
        let mut relayed = 0;
        let mut delivery_error = None;

        for (idx, item) in items.iter().enumerate() {
            let text = format_message(item);
            let result = self
                .slack
                .post_message(&self.settings.slack_channel, &text)
                .await;
            match result {
                Ok(()) => {
                    relayed += 1;
                    tracing::info!(user_id, tweet_id = item.tweet_id, url = %item.url, "Relayed tweet");
                }
                Err(e) => {
                    // Resume at the failed tweet next cycle.
                    high_water = item.tweet_id - 1;
                    for unsent in &items[idx..] {
                        self.recent.remove(&unsent.url);
                    }
                    delivery_error = Some(e);
                    break;
                }
            }
        }

        if high_water > since_id {
            SubscriptionRepo::update_latest_tweet_id(&self.pool, user_id, high_water).await?;
        }

        match delivery_error {
            Some(e) => Err(e.into()),
            None => Ok(PollOutcome::Relayed(relayed)),
        }
    }
}
