//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&DbPool` as the first argument.

pub mod subscription_repo;

pub use subscription_repo::SubscriptionRepo;
