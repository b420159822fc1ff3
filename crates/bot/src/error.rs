use tothc_core::error::CoreError;
use tothc_slack::SlackError;
use tothc_twitter::TwitterError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Twitter error: {0}")]
    Twitter(#[from] TwitterError),

    #[error("Slack error: {0}")]
    Slack(#[from] SlackError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}
