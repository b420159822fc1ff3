//! `tothc-bot` library crate.
//!
//! Holds the relay runtime so it can be driven by integration tests with
//! in-process fakes; the binary entrypoint lives in `main.rs`.

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod sources;
pub mod subscriptions;

pub use bot::{BotSettings, CycleReport, TothcBot};
pub use error::BotError;
pub use sources::{MessageSink, TimelineSource};
pub use subscriptions::SubscriptionManager;
