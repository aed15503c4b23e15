//! Multi-source aggregation: fan-out, merge, dedup, fallback.

pub mod engine;
pub mod merge;
pub mod types;

pub use engine::{AggregatorEngine, EngineConfig};
pub use types::RequestOptions;
