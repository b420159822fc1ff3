/// SQLite rowids.
pub type DbId = i64;

/// Twitter status ids are snowflakes and fit in an `i64`.
pub type TweetId = i64;

/// Numeric Twitter account id.
pub type TwitterUserId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
