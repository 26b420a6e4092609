//! Track and source records
//!
//! This module defines the per-track and per-source state stored in the
//! registry, plus the point-in-time snapshot handed out for scheduling
//! decisions.

use std::collections::HashSet;

use tokio::sync::broadcast;
use tokio::time::{Duration, Instant};

use crate::delivery::Backpressure;
use crate::generator::runner::GeneratorHandle;
use crate::generator::TrackMode;
use crate::stats::{RateWindow, TrackStats};

use super::config::{RegistryConfig, TrackConfig};
use super::frame::{SourceId, TrackId, VideoFrame};

/// Camera facing hint for an external source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// User-facing camera
    Front,
    /// World-facing camera
    Back,
}

/// Record for one external frame source
///
/// The hints are informational: routing ignores them, but the external
/// collaborator can read them back after an update.
#[derive(Debug)]
pub struct SourceEntry {
    /// Source identifier
    pub id: SourceId,

    /// Camera facing hint
    pub facing: Option<Facing>,

    /// Torch-enabled hint
    pub torch: Option<bool>,

    /// Upper frame rate hint
    pub max_fps: Option<u32>,

    /// Tracks currently bound to this source
    pub bound: HashSet<TrackId>,

    /// When the source was created
    pub created_at: Instant,
}

impl SourceEntry {
    pub(super) fn new(id: SourceId) -> Self {
        Self {
            id,
            facing: None,
            torch: None,
            max_fps: None,
            bound: HashSet::new(),
            created_at: Instant::now(),
        }
    }
}

/// Partial update of a source's hints
#[derive(Debug, Clone, Default)]
pub struct SourceUpdate {
    /// New facing hint
    pub facing: Option<Facing>,
    /// New torch hint
    pub torch: Option<bool>,
    /// New upper frame rate hint
    pub max_fps: Option<u32>,
}

impl SourceUpdate {
    /// Set the facing hint
    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = Some(facing);
        self
    }

    /// Set the torch hint
    pub fn torch(mut self, torch: bool) -> Self {
        self.torch = Some(torch);
        self
    }

    /// Set the upper frame rate hint
    pub fn max_fps(mut self, max_fps: u32) -> Self {
        self.max_fps = Some(max_fps);
        self
    }
}

/// Point-in-time snapshot of a source
#[derive(Debug, Clone)]
pub struct SourceState {
    /// Source identifier
    pub id: SourceId,
    /// Camera facing hint
    pub facing: Option<Facing>,
    /// Torch-enabled hint
    pub torch: Option<bool>,
    /// Upper frame rate hint
    pub max_fps: Option<u32>,
    /// Tracks currently bound to this source
    pub tracks: Vec<TrackId>,
}

/// Record for one track in the registry
pub struct TrackEntry {
    /// Track identifier
    pub id: TrackId,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Target frame rate
    pub fps: u32,

    /// How the track's frames are produced
    pub mode: TrackMode,

    /// Backpressure policy
    pub backpressure: Backpressure,

    /// While paused, no frames are emitted and no stats accumulate
    pub paused: bool,

    /// While set, emission is suppressed (quiesce after reconfiguration)
    pub reconfiguring: bool,

    /// Guards stale quiesce clearances: a clearance task only lowers the
    /// flag if the epoch still matches
    pub(crate) reconfigure_epoch: u64,

    /// Source this track is bound to, if any
    pub source: Option<SourceId>,

    /// When the last frame was emitted
    pub(crate) last_emit: Option<Instant>,

    /// Single pending slot for `latest-wins`/`throttle` coalescing
    pub(crate) pending: Option<VideoFrame>,

    /// Rolling produced/delivered window
    pub(crate) window: RateWindow,

    /// Cumulative dropped frames since creation or last reconfigure
    pub dropped_frames: u64,

    /// Broadcast sender for the track's downstream sink
    pub(crate) tx: broadcast::Sender<VideoFrame>,

    /// Generator driving this track, for `generated-*` modes
    pub(crate) generator: Option<GeneratorHandle>,

    /// When the track was created
    pub created_at: Instant,
}

impl TrackEntry {
    /// Create a new track record
    pub(crate) fn new(id: TrackId, config: &TrackConfig, registry: &RegistryConfig) -> Self {
        let (tx, _) = broadcast::channel(registry.broadcast_capacity);

        Self {
            id,
            width: config.width,
            height: config.height,
            fps: config.fps,
            mode: config.mode,
            backpressure: config.backpressure,
            paused: false,
            reconfiguring: false,
            reconfigure_epoch: 0,
            source: None,
            last_emit: None,
            pending: None,
            window: RateWindow::new(registry.stats_window),
            dropped_frames: 0,
            tx,
            generator: None,
            created_at: Instant::now(),
        }
    }

    /// Cadence interval derived from the target frame rate
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Subscribe to this track's frame stream
    pub(super) fn subscribe(&self) -> broadcast::Receiver<VideoFrame> {
        self.tx.subscribe()
    }

    /// Number of attached downstream sinks
    pub fn sink_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Point-in-time copy for scheduling decisions
    pub fn snapshot(&self) -> TrackState {
        TrackState {
            id: self.id,
            width: self.width,
            height: self.height,
            fps: self.fps,
            mode: self.mode,
            backpressure: self.backpressure,
            paused: self.paused,
            reconfiguring: self.reconfiguring,
            source: self.source,
        }
    }

    /// Current stats, from the last completed window when available
    pub fn stats(&self) -> TrackStats {
        TrackStats {
            produced_fps: self.window.produced_fps(),
            delivered_fps: self.window.delivered_fps(),
            dropped_frames: self.dropped_frames,
        }
    }

    /// Zero all accounting and cadence state
    ///
    /// Applied as part of reconfiguration, together with the config change.
    pub(crate) fn reset_counters(&mut self, now: Instant) {
        self.window.reset(now);
        self.dropped_frames = 0;
        self.last_emit = None;
        self.pending = None;
    }

    /// Raise the reconfiguration flag and invalidate older clearance tasks
    ///
    /// Returns the new epoch the matching clearance must present.
    pub(crate) fn begin_quiesce(&mut self, now: Instant) -> u64 {
        self.reconfiguring = true;
        self.reconfigure_epoch += 1;
        self.reset_counters(now);
        self.reconfigure_epoch
    }
}

impl std::fmt::Debug for TrackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackEntry")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fps", &self.fps)
            .field("mode", &self.mode)
            .field("backpressure", &self.backpressure)
            .field("paused", &self.paused)
            .field("reconfiguring", &self.reconfiguring)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Point-in-time snapshot of a track
#[derive(Debug, Clone)]
pub struct TrackState {
    /// Track identifier
    pub id: TrackId,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Target frame rate
    pub fps: u32,
    /// How the track's frames are produced
    pub mode: TrackMode,
    /// Backpressure policy
    pub backpressure: Backpressure,
    /// Whether the track is paused
    pub paused: bool,
    /// Whether the track is inside a reconfiguration quiesce window
    pub reconfiguring: bool,
    /// Source this track is bound to, if any
    pub source: Option<SourceId>,
}
