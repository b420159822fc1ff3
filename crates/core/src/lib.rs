//! Domain types and relay logic shared by the TOTHC crates.
//!
//! Nothing in here talks to the network or the database; the client and
//! storage crates build on these types.

pub mod error;
pub mod relay;
pub mod tweet;
pub mod types;
