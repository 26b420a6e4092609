//! Test-pattern rendering contract
//!
//! Renderers synthesize deterministic BGRA patterns whose phase cycles over
//! a fixed five-second period, so any two frames with the same capture
//! timestamp are pixel-identical regardless of strategy.

use crate::registry::frame::VideoFrame;

use super::gradient::GradientRenderer;
use super::scanline::ScanlineRenderer;
use super::TrackMode;

/// Phase cycle period in nanoseconds
const PHASE_PERIOD_NS: i64 = 5_000_000_000;

/// Bytes per BGRA pixel
pub(crate) const BYTES_PER_PIXEL: usize = 4;

/// Pattern phase in `[0, 1)` for a capture timestamp
pub(crate) fn phase_at(timestamp_ns: i64) -> f64 {
    (timestamp_ns.rem_euclid(PHASE_PERIOD_NS)) as f64 / PHASE_PERIOD_NS as f64
}

/// A synthetic pattern strategy
///
/// Implementations are driven from a single generator task, one frame per
/// timer tick. Returning `None` signals a buffer acquisition failure: the
/// tick is counted as dropped and the next tick retries.
pub trait PatternRenderer: Send {
    /// Apply a new resolution; takes effect from the next produced frame
    fn set_resolution(&mut self, width: u32, height: u32);

    /// Produce one frame for the given capture timestamp
    fn render(&mut self, timestamp_ns: i64) -> Option<VideoFrame>;
}

/// Select the renderer for a generated mode
///
/// Panics if called for `external` mode; the registry never does.
pub(crate) fn for_mode(
    mode: TrackMode,
    width: u32,
    height: u32,
    pool_size: usize,
) -> Box<dyn PatternRenderer> {
    match mode {
        TrackMode::GeneratedGpu => Box::new(GradientRenderer::new(width, height, pool_size)),
        TrackMode::GeneratedCpu => Box::new(ScanlineRenderer::new(width, height)),
        TrackMode::External => unreachable!("external tracks own no generator"),
    }
}
