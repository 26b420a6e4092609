//! Track/source registry
//!
//! The registry is the single authoritative, concurrently-accessed store of
//! all track and source state. Frames reach a track from its own generator
//! or from the external source router; both paths consult the registry and
//! funnel through the delivery gate before landing on the track's broadcast
//! channel.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<TrackRegistry>
//!                 ┌──────────────────────────────┐
//!                 │ tracks: HashMap<TrackId,     │
//!                 │   TrackEntry {               │
//!                 │     config, policy, window,  │
//!                 │     pending, tx: broadcast,  │
//!                 │     generator,               │
//!                 │   }                          │
//!                 │ >                            │
//!                 │ sources: HashMap<SourceId,   │
//!                 │   SourceEntry { bound, .. }> │
//!                 └──────────────┬───────────────┘
//!                                │
//!         ┌──────────────────────┼──────────────────────┐
//!         │                      │                      │
//!         ▼                      ▼                      ▼
//!    [Generator]           [FrameRouter]           [Subscriber]
//!    tick → admit()        route_frame()           frame_rx.recv()
//!         │                      │                      ▲
//!         └──────► delivery gate ┴──► tx.send() ────────┘
//! ```
//!
//! # Zero-Copy Design
//!
//! `bytes::Bytes` uses reference counting, so every track a frame fans out
//! to shares the same pixel allocation. The broadcast channel clones the
//! `VideoFrame`, but the inner `Bytes` data is only reference-counted, not
//! copied, and is treated as read-only downstream of capture.

pub mod config;
pub mod entry;
pub mod error;
pub mod frame;
pub mod store;

pub use config::{RegistryConfig, TrackConfig, TrackUpdate};
pub use entry::{Facing, SourceState, SourceUpdate, TrackState};
pub use error::RegistryError;
pub use frame::{monotonic_timestamp_ns, SourceId, TrackId, VideoFrame};
pub use store::TrackRegistry;
