//! Throughput statistics
//!
//! Rolling per-track rate windows and the aggregate read types exposed by
//! the registry. The delivery scheduler is the only writer; everything here
//! is exposed read-only through [`crate::registry::TrackRegistry`].

pub mod metrics;

pub use metrics::{AggregateStats, RateWindow, TrackStats};
