//! Per-track throughput accounting
//!
//! Each track owns a [`RateWindow`]: a rolling accounting period (one second
//! by default) of produced and delivered frame counts. The delivery gate is
//! the sole writer; stats queries are read-only and never roll the window
//! themselves.

use tokio::time::{Duration, Instant};

/// Rolling produced/delivered counter for one track
///
/// The window rolls whenever a scheduler invocation observes that at least
/// one full period has elapsed; rolls are per track, not globally
/// synchronized. Until the first roll completes, readers fall back to the
/// in-progress counts so a freshly created track does not report all-zero
/// for up to a full period.
#[derive(Debug, Clone)]
pub struct RateWindow {
    /// Accounting period
    span: Duration,
    /// Start of the in-progress window
    started: Instant,
    /// Frames produced in the in-progress window
    produced: u32,
    /// Frames delivered in the in-progress window
    delivered: u32,
    /// Produced count of the last completed window
    last_produced: u32,
    /// Delivered count of the last completed window
    last_delivered: u32,
    /// Whether any window has completed yet
    rolled: bool,
}

impl RateWindow {
    /// Create a window starting now
    pub fn new(span: Duration) -> Self {
        Self::starting_at(span, Instant::now())
    }

    /// Create a window with an explicit start instant
    pub fn starting_at(span: Duration, now: Instant) -> Self {
        Self {
            span,
            started: now,
            produced: 0,
            delivered: 0,
            last_produced: 0,
            last_delivered: 0,
            rolled: false,
        }
    }

    /// Roll the window if a full period has elapsed
    ///
    /// Returns `true` when a roll happened. Called on each scheduler
    /// invocation; at most one roll per elapsed period.
    pub fn roll_if_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.started) < self.span {
            return false;
        }
        self.last_produced = self.produced;
        self.last_delivered = self.delivered;
        self.produced = 0;
        self.delivered = 0;
        self.started = now;
        self.rolled = true;
        true
    }

    /// Count a produced frame in the current window
    pub fn record_produced(&mut self) {
        self.produced += 1;
    }

    /// Count a delivered frame in the current window
    pub fn record_delivered(&mut self) {
        self.delivered += 1;
    }

    /// Produced rate: last completed window, or the in-progress count before
    /// the first roll
    pub fn produced_fps(&self) -> u32 {
        if self.rolled {
            self.last_produced
        } else {
            self.produced
        }
    }

    /// Delivered rate: last completed window, or the in-progress count before
    /// the first roll
    pub fn delivered_fps(&self) -> u32 {
        if self.rolled {
            self.last_delivered
        } else {
            self.delivered
        }
    }

    /// Delivered count of the last completed window (zero if none completed)
    pub fn completed_delivered(&self) -> u32 {
        if self.rolled {
            self.last_delivered
        } else {
            0
        }
    }

    /// Delivered count of the in-progress window
    pub fn current_delivered(&self) -> u32 {
        self.delivered
    }

    /// Zero all counters and restart the window
    ///
    /// Used by reconfiguration, which resets accounting along with the
    /// track's config.
    pub fn reset(&mut self, now: Instant) {
        self.produced = 0;
        self.delivered = 0;
        self.last_produced = 0;
        self.last_delivered = 0;
        self.started = now;
        self.rolled = false;
    }
}

/// Statistics for a single track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackStats {
    /// Frames produced per accounting period
    pub produced_fps: u32,
    /// Frames delivered per accounting period
    pub delivered_fps: u32,
    /// Cumulative dropped frames since creation or last reconfigure
    pub dropped_frames: u64,
}

/// Statistics summed across all tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Sum of delivered rates across tracks
    pub fps: u32,
    /// Sum of cumulative dropped frames across tracks
    pub dropped_frames: u64,
}
