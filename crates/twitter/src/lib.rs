//! Twitter REST API v1.1 client.
//!
//! Requests are signed with OAuth 1.0a user context credentials
//! ([`OAuth10aTokens`]); see [`oauth`] for the signing scheme.

pub mod client;
pub mod error;
pub mod oauth;

pub use client::{TwitterClient, DEFAULT_API_URL, MAX_TIMELINE_PAGES, TIMELINE_PAGE_SIZE};
pub use error::TwitterError;
pub use oauth::OAuth10aTokens;
