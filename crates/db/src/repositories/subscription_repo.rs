//! Repository for the `twitter_subscriptions` table.

use chrono::Utc;
use tothc_core::types::{TweetId, TwitterUserId};

use crate::models::subscription::{SubscribeOutcome, TwitterSubscription};
use crate::DbPool;

/// Column list for `twitter_subscriptions` queries.
const COLUMNS: &str = "\
    id, user_id, screen_name, subscribed_at, unsubscribed_at, \
    latest_tweet_id, refreshed_latest_tweet_id_at";

/// Provides query operations for Twitter subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Subscribe to a Twitter account.
    ///
    /// An inactive row for the same `user_id` is re-enabled rather than
    /// duplicated; an active one is left untouched.
    pub async fn subscribe(
        pool: &DbPool,
        user_id: TwitterUserId,
        screen_name: &str,
    ) -> Result<SubscribeOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // This subscription might be inactive.
        let query = format!("SELECT {COLUMNS} FROM twitter_subscriptions WHERE user_id = ?1");
        let existing = sqlx::query_as::<_, TwitterSubscription>(&query)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let outcome = match existing {
            Some(subscription) if !subscription.is_active() => {
                tracing::info!(
                    user_id,
                    screen_name,
                    "Re-enabling existing subscription"
                );
                sqlx::query(
                    "UPDATE twitter_subscriptions \
                     SET screen_name = ?2, subscribed_at = ?3, unsubscribed_at = NULL \
                     WHERE user_id = ?1",
                )
                .bind(user_id)
                .bind(screen_name)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
                SubscribeOutcome::Reactivated
            }
            Some(_) => {
                tracing::info!(user_id, screen_name, "User already has an active subscription");
                SubscribeOutcome::AlreadyActive
            }
            None => {
                tracing::info!(user_id, screen_name, "Adding new subscription");
                sqlx::query(
                    "INSERT INTO twitter_subscriptions (user_id, screen_name, subscribed_at) \
                     VALUES (?1, ?2, ?3)",
                )
                .bind(user_id)
                .bind(screen_name)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
                SubscribeOutcome::Created
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Unsubscribe by stored screen name, ignoring case.
    ///
    /// Matches on the screen name in our table instead of the user id
    /// because accounts can end up in states (suspended, deleted) where
    /// Twitter no longer resolves them. Returns the number of rows changed.
    pub async fn unsubscribe(pool: &DbPool, screen_name: &str) -> Result<u64, sqlx::Error> {
        tracing::info!(screen_name, "Unsubscribing from screen name");
        let result = sqlx::query(
            "UPDATE twitter_subscriptions \
             SET unsubscribed_at = ?2, latest_tweet_id = NULL, \
                 refreshed_latest_tweet_id_at = NULL \
             WHERE screen_name = ?1 COLLATE NOCASE",
        )
        .bind(screen_name)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Record a new handle for an account.
    pub async fn update_screen_name(
        pool: &DbPool,
        user_id: TwitterUserId,
        screen_name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE twitter_subscriptions SET screen_name = ?2 WHERE user_id = ?1")
            .bind(user_id)
            .bind(screen_name)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// High-water mark for an account, `None` if unknown or never set.
    pub async fn get_latest_tweet_id_for_user_id(
        pool: &DbPool,
        user_id: TwitterUserId,
    ) -> Result<Option<TweetId>, sqlx::Error> {
        let row: Option<(Option<TweetId>,)> =
            sqlx::query_as("SELECT latest_tweet_id FROM twitter_subscriptions WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.and_then(|(id,)| id))
    }

    /// Move the high-water mark and stamp when it moved.
    pub async fn update_latest_tweet_id(
        pool: &DbPool,
        user_id: TwitterUserId,
        latest_tweet_id: TweetId,
    ) -> Result<(), sqlx::Error> {
        tracing::info!(user_id, latest_tweet_id, "Updating latest tweet ID");
        sqlx::query(
            "UPDATE twitter_subscriptions \
             SET refreshed_latest_tweet_id_at = ?2, latest_tweet_id = ?3 \
             WHERE user_id = ?1",
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(latest_tweet_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_user_id(
        pool: &DbPool,
        user_id: TwitterUserId,
    ) -> Result<Option<TwitterSubscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM twitter_subscriptions WHERE user_id = ?1");
        sqlx::query_as::<_, TwitterSubscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Active subscriptions ordered by screen name.
    pub async fn list_active(pool: &DbPool) -> Result<Vec<TwitterSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM twitter_subscriptions \
             WHERE unsubscribed_at IS NULL \
             ORDER BY screen_name COLLATE NOCASE"
        );
        sqlx::query_as::<_, TwitterSubscription>(&query)
            .fetch_all(pool)
            .await
    }

    /// Every subscription, active or not, ordered by screen name.
    pub async fn list_all(pool: &DbPool) -> Result<Vec<TwitterSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM twitter_subscriptions ORDER BY screen_name COLLATE NOCASE"
        );
        sqlx::query_as::<_, TwitterSubscription>(&query)
            .fetch_all(pool)
            .await
    }
}
