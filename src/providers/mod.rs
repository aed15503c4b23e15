//! Provider adapter contract and registry.
//!
//! One adapter per upstream catalog (Spotify, YouTube, Last.fm, Deezer),
//! all normalizing into the shared [`crate::models::Track`] shape.

pub mod manager;
pub mod titles;
pub mod traits;
pub mod types;

pub use manager::ProviderManager;
pub use traits::MusicProvider;
pub use types::ProviderId;
