//! Row types for the database tables.

pub mod subscription;

pub use subscription::{SubscribeOutcome, TwitterSubscription};
