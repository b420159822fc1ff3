//! `tothc-bot` -- relays tweets from watched Twitter accounts into Slack.
//!
//! # Environment variables
//!
//! | Variable                      | Used by               | Description                         |
//! |-------------------------------|-----------------------|-------------------------------------|
//! | `TOTHC_SQLITE_DB`             | all                   | Path of the SQLite database file    |
//! | `TWITTER_CONSUMER_KEY`        | `run`, `subscribe`    | OAuth 1.0a app key                  |
//! | `TWITTER_CONSUMER_SECRET`     | `run`, `subscribe`    | OAuth 1.0a app secret               |
//! | `TWITTER_ACCESS_TOKEN`        | `run`, `subscribe`    | OAuth 1.0a user token               |
//! | `TWITTER_ACCESS_TOKEN_SECRET` | `run`, `subscribe`    | OAuth 1.0a user token secret        |
//! | `SLACK_TOKEN`                 | `run`                 | Slack bot token                     |
//! | `SLACK_CHANNEL`               | `run`                 | Channel the tweets are posted to    |
//! | `POLL_INTERVAL_SECS`          | `run`                 | Seconds between polls (default 60)  |
//! | `RELAY_FILTER`                | `run`                 | `media` (default) or `all`          |
//! | `LOG_FORMAT`                  | all                   | `json` for JSON log lines           |

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use tothc_bot::config::{Cli, Command};
use tothc_bot::{logging, SubscriptionManager, TothcBot};
use tothc_db::models::SubscribeOutcome;
use tothc_slack::SlackClient;
use tothc_twitter::TwitterClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    // --- Database ---
    let pool = tothc_db::create_pool(&cli.sqlite_db)
        .await
        .with_context(|| format!("Failed to open database {}", cli.sqlite_db.display()))?;
    tothc_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tothc_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(path = %cli.sqlite_db.display(), "Database ready");

    let manager = SubscriptionManager::new(pool.clone());

    match cli.command {
        Command::Run(args) => {
            let settings = args.settings()?;
            let twitter = TwitterClient::new(args.twitter.tokens())?;
            let slack = SlackClient::new(args.slack_token.clone())?;

            let cancel = CancellationToken::new();
            let signal_cancel = cancel.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                signal_cancel.cancel();
            });

            let mut bot = TothcBot::new(pool.clone(), twitter, slack, settings);
            bot.run(cancel).await;
        }
        Command::Subscribe(args) => {
            let twitter = TwitterClient::new(args.twitter.tokens())?;
            let (user, outcome) = manager.subscribe(&twitter, &args.screen_name).await?;
            let verb = match outcome {
                SubscribeOutcome::Created => "Subscribed to",
                SubscribeOutcome::Reactivated => "Re-subscribed to",
                SubscribeOutcome::AlreadyActive => "Already subscribed to",
            };
            println!("{verb} @{} (user id {})", user.screen_name, user.id);
        }
        Command::Unsubscribe { screen_name } => {
            let changed = manager.unsubscribe(&screen_name).await?;
            if changed == 0 {
                println!("No subscription found for {screen_name}");
            } else {
                println!("Unsubscribed from {screen_name}");
            }
        }
        Command::List { all } => {
            for sub in manager.list(all).await? {
                let status = if sub.is_active() { "active" } else { "inactive" };
                let latest = sub
                    .latest_tweet_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "@{:<15} {:>20} {:<8} latest={} since={}",
                    sub.screen_name,
                    sub.user_id,
                    status,
                    latest,
                    sub.subscribed_at.to_rfc3339()
                );
            }
        }
    }

    pool.close().await;
    tracing::info!("Successfully shut down");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
