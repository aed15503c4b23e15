//! Primary streaming-metadata catalog adapter.

pub mod client;
pub mod models;
pub mod provider;

pub use client::SpotifyClient;
pub use provider::SpotifyProvider;
