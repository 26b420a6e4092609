//! Frame and handle types for track routing
//!
//! This module defines the opaque handles that identify tracks and sources,
//! and the frame type that flows from generators and external sources to
//! downstream sinks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use bytes::Bytes;

/// Opaque handle for a track
///
/// Allocated by the registry; callers never construct one from a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(pub(crate) u64);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "trk-{}", self.0)
    }
}

/// Opaque handle for an external frame source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) u64);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "src-{}", self.0)
    }
}

/// Monotonic handle allocator shared by the registry
#[derive(Debug, Default)]
pub(crate) struct HandleAllocator {
    next: AtomicU64,
}

impl HandleAllocator {
    pub(crate) fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// A timestamped pixel buffer
///
/// The pixel data is opaque to the core: only width, height and the capture
/// timestamp are semantically used. Cloning is cheap because `Bytes` is
/// reference-counted; fan-out to multiple tracks shares one allocation and
/// buffers are treated as read-only downstream of capture.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel data (zero-copy via reference counting)
    pub data: Bytes,
    /// Monotonic capture timestamp in nanoseconds
    pub timestamp_ns: i64,
}

impl VideoFrame {
    /// Create a frame from a captured buffer
    pub fn new(width: u32, height: u32, data: Bytes, timestamp_ns: i64) -> Self {
        Self {
            width,
            height,
            data,
            timestamp_ns,
        }
    }
}

/// Current monotonic timestamp in nanoseconds
///
/// Measured from a process-lifetime epoch. Callers pushing external frames
/// use this to stamp captures that arrive without their own clock.
pub fn monotonic_timestamp_ns() -> i64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as i64
}
