//! # vtrack
//!
//! Synthetic video track engine: cadence-gated frame delivery to multiple
//! independent logical tracks, with selectable backpressure policies, live
//! per-track throughput statistics, and in-place reconfiguration.
//!
//! A [`TrackRegistry`] owns every track and source. Tracks in a `generated-*`
//! mode produce a deterministic test pattern on their own timer; `external`
//! tracks are fed through a [`FrameRouter`], which fans each pushed frame out
//! to every track bound to its source. Both paths pass the per-track delivery
//! gate, which paces emission to the track's target rate under one of three
//! policies: `drop-late` (default), `latest-wins`, or `throttle`.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vtrack::{Backpressure, TrackConfig, TrackMode, TrackRegistry, TrackUpdate};
//!
//! # async fn example() -> Result<(), vtrack::RegistryError> {
//! let registry = Arc::new(TrackRegistry::new());
//!
//! // A self-driving test pattern track at 720p30
//! let track = registry
//!     .create_track(
//!         None,
//!         TrackConfig::default()
//!             .fps(30)
//!             .mode(TrackMode::GeneratedCpu)
//!             .backpressure(Backpressure::LatestWins),
//!     )
//!     .await?;
//!
//! // The downstream sink: a push stream of timestamped frames
//! let mut frames = registry.subscribe(track).await?;
//! tokio::spawn(async move {
//!     while let Ok(frame) = frames.recv().await {
//!         println!("{}x{} @ {}ns", frame.width, frame.height, frame.timestamp_ns);
//!     }
//! });
//!
//! // Live retargeting without tearing the track down
//! registry.reconfigure(track, TrackUpdate::default().fps(15)).await?;
//!
//! let stats = registry.stats_for(track).await?;
//! println!("delivering {} fps", stats.delivered_fps);
//!
//! registry.dispose_track(track).await?;
//! # Ok(())
//! # }
//! ```
//!
//! All state is process-lifetime only; nothing is persisted. Encoding,
//! transport and real capture devices are out of scope; the crate's job
//! ends at producing a stream of timestamped frame buffers per track.

pub mod delivery;
pub mod generator;
pub mod registry;
pub mod router;
pub mod stats;

pub use delivery::{Backpressure, ParsePolicyError};
pub use generator::{ParseModeError, PatternRenderer, TrackMode};
pub use registry::{
    monotonic_timestamp_ns, Facing, RegistryConfig, RegistryError, SourceId, SourceState,
    SourceUpdate, TrackConfig, TrackId, TrackRegistry, TrackState, TrackUpdate, VideoFrame,
};
pub use router::FrameRouter;
pub use stats::{AggregateStats, TrackStats};
