//! Managing which accounts the bot watches.

use tothc_core::error::normalize_screen_name;
use tothc_core::tweet::TwitterUser;
use tothc_db::models::{SubscribeOutcome, TwitterSubscription};
use tothc_db::repositories::SubscriptionRepo;
use tothc_db::DbPool;

use crate::error::BotError;
use crate::sources::TimelineSource;

pub struct SubscriptionManager {
    pool: DbPool,
}

impl SubscriptionManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Start watching an account.
    ///
    /// The handle is resolved through Twitter first so the row stores the
    /// stable numeric id and the canonical casing of the screen name.
    pub async fn subscribe<S: TimelineSource + ?Sized>(
        &self,
        twitter: &S,
        screen_name: &str,
    ) -> Result<(TwitterUser, SubscribeOutcome), BotError> {
        let screen_name = normalize_screen_name(screen_name)?;
        let user = twitter.lookup_user(&screen_name).await?;
        let outcome = SubscriptionRepo::subscribe(&self.pool, user.id, &user.screen_name).await?;
        Ok((user, outcome))
    }

    /// Stop watching an account. Works from the database alone, so
    /// suspended or deleted accounts can still be removed.
    pub async fn unsubscribe(&self, screen_name: &str) -> Result<u64, BotError> {
        let screen_name = normalize_screen_name(screen_name)?;
        Ok(SubscriptionRepo::unsubscribe(&self.pool, &screen_name).await?)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<TwitterSubscription>, BotError> {
        let subscriptions = if include_inactive {
            SubscriptionRepo::list_all(&self.pool).await?
        } else {
            SubscriptionRepo::list_active(&self.pool).await?
        };
        Ok(subscriptions)
    }
}
