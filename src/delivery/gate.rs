//! Per-frame delivery decision
//!
//! For each candidate frame arriving at a track, from its own generator or
//! from the external source router, decide whether to emit it now, hold it
//! in the track's single pending slot, or drop it, according to the track's
//! backpressure policy and target cadence. This function is the sole writer
//! of the track's throughput counters.

use tokio::time::Instant;

use crate::registry::entry::TrackEntry;
use crate::registry::frame::VideoFrame;

use super::policy::Backpressure;

/// Gate a candidate frame against the track's cadence and policy
///
/// Returns the frame to push downstream, or `None` when the arrival was
/// suppressed. The emitted frame keeps its own capture timestamp; under
/// `latest-wins`/`throttle` it is taken from the pending slot, so at most
/// one frame is ever buffered per track regardless of arrival burstiness.
pub(crate) fn admit(entry: &mut TrackEntry, frame: VideoFrame, now: Instant) -> Option<VideoFrame> {
    // Deliberate quiesce, not congestion: no counters move.
    if entry.paused || entry.reconfiguring {
        return None;
    }

    entry.window.roll_if_due(now);
    entry.window.record_produced();

    let interval = entry.interval();
    let due = match entry.last_emit {
        None => true,
        Some(last) => now.duration_since(last) >= interval,
    };

    match entry.backpressure {
        Backpressure::DropLate => {
            if due {
                entry.last_emit = Some(now);
                entry.window.record_delivered();
                Some(frame)
            } else {
                entry.dropped_frames += 1;
                None
            }
        }
        Backpressure::LatestWins => {
            // Replace, never queue: the previous pending frame is released.
            entry.pending = Some(frame);
            if due {
                let out = entry.pending.take();
                entry.last_emit = Some(now);
                entry.window.record_delivered();
                out
            } else {
                entry.dropped_frames += 1;
                None
            }
        }
        Backpressure::Throttle => {
            entry.pending = Some(frame);
            if due {
                let out = entry.pending.take();
                entry.last_emit = Some(now);
                entry.window.record_delivered();
                out
            } else {
                None
            }
        }
    }
}
