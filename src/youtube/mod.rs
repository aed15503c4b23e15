//! Video-platform music index adapter.
//!
//! The expensive one: every search is billed 100 quota units against a
//! hard 10 000 units/day budget, so this provider sits behind the quota
//! manager and gets the longest fan-out timeout.

pub mod client;
pub mod models;
pub mod provider;

pub use client::YoutubeClient;
pub use provider::YoutubeProvider;
