//! Tag-service adapter (Last.fm).
//!
//! Strong on genre tags, weak on everything else: no millisecond
//! durations, artist sometimes a string and sometimes an object, and a
//! well-known grey-star placeholder served where cover art should be.

pub mod client;
pub mod models;
pub mod provider;

pub use client::LastfmClient;
pub use provider::LastfmProvider;
